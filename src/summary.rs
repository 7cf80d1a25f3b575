//! Namespace summary reports.
//!
//! A summary is built in two steps. [`build_report`] turns a classified
//! namespace into a [`Report`]: the requested sections, in the requested
//! order, each holding logical rows, column labels and justification hints.
//! [`write_report`] then lays the report out as boxed headings and tables;
//! [`write_report_json`] emits the same rows as JSON.

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::classify::{classify, Category, Classification};
use crate::namespace::{normalize, NamespaceError, NamespaceLike};
use crate::table::{bullet, format_number, terminal_width, text_box, Compaction, Justify, Table};
use crate::theme::{Style, Theme};
use crate::value::{Docstring, Value};

/// Module paths longer than this are shortened unless verbose.
pub const DEFAULT_MODULE_PATH_WIDTH: usize = 25;

/// Placeholder for namespaces that declare no name.
pub const UNNAMED: &str = "[unnamed]";

/// Errors that can occur while producing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A report section that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Title,
    Category(Category),
}

impl Section {
    /// Title followed by every category, in canonical order.
    pub fn all() -> Vec<Section> {
        std::iter::once(Section::Title)
            .chain(Category::ALL.into_iter().map(Section::Category))
            .collect()
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "title" {
            return Ok(Section::Title);
        }
        s.parse::<Category>()
            .map(Section::Category)
            .map_err(|_| format!("unknown section: {s}"))
    }
}

/// Options for building and rendering a summary.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Sections to render, in order. `None` renders [`Section::all`].
    pub sections: Option<Vec<Section>>,
    /// Disable module path shortening.
    pub verbose: bool,
    /// Width above which module paths are shortened.
    pub module_path_width: usize,
    /// Total width bound for tables. `None` uses the terminal width.
    pub max_width: Option<usize>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            sections: None,
            verbose: false,
            module_path_width: DEFAULT_MODULE_PATH_WIDTH,
            max_width: None,
        }
    }
}

impl SummaryOptions {
    fn sections(&self) -> Vec<Section> {
        self.sections.clone().unwrap_or_else(Section::all)
    }
}

/// A category count shown in the title block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Heading and counts for the whole namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleBlock {
    pub name: Option<String>,
    pub total: usize,
    pub counts: Vec<CategoryCount>,
}

impl TitleBlock {
    pub fn heading(&self) -> String {
        format!(
            "Namespace Summary for {}",
            self.name.as_deref().unwrap_or(UNNAMED)
        )
    }
}

/// One category's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSection {
    pub category: Category,
    pub labels: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    #[serde(skip)]
    pub justify: Vec<Justify>,
    #[serde(skip)]
    pub compaction: Compaction,
}

/// A rendered unit of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportSection {
    Title(TitleBlock),
    Table(TableSection),
}

/// A complete report, sections in the order they were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub sections: Vec<ReportSection>,
}

/// First meaningful line of a docstring.
///
/// Skips lines that are blank or made only of `=` separators and returns the
/// first remaining line with leading whitespace removed, or an empty string
/// when every line is skipped. `None` stays `None`.
pub fn process_docstring(doc: Option<&str>) -> Option<String> {
    let doc = doc?;
    let line = doc
        .lines()
        .find(|line| !line.trim().trim_matches('=').trim().is_empty())
        .map(|line| line.trim_start().to_string())
        .unwrap_or_default();
    Some(line)
}

/// Table cell for a value's documentation.
///
/// Missing documentation renders empty; documentation that is not text is
/// shown as-is.
pub fn doc_cell(doc: &Docstring) -> String {
    match doc {
        Docstring::Missing => String::new(),
        Docstring::Text(text) => process_docstring(Some(text)).unwrap_or_default(),
        Docstring::Raw(raw) => raw.clone(),
    }
}

/// Path of `module` relative to the enclosing namespace `namespace`.
///
/// Everything through the last occurrence of the namespace name is dropped,
/// so `pkg.sub.leaf` relative to `pkg` is `.sub.leaf` and `pkg` itself is
/// empty. Unnamed namespaces leave the path whole.
pub fn relative_module_path(module: Option<&str>, namespace: Option<&str>) -> String {
    let module = module.unwrap_or_default();
    match namespace {
        Some(name) if !name.is_empty() => module.rsplit(name).next().unwrap_or(module).to_string(),
        _ => module.to_string(),
    }
}

/// Shorten a dotted module path to its rightmost segments.
///
/// Paths of at most `width` characters are returned unchanged. Longer paths
/// lose one leading `.` and then their leading segments, one at a time, until
/// the rest fits in `width`; each dropped segment leaves a `.` behind.
pub fn truncate_module_path(path: &str, width: usize) -> String {
    if path.chars().count() <= width {
        return path.to_string();
    }
    let mut rest = path.strip_prefix('.').unwrap_or(path);
    let mut dropped = 0;
    while rest.chars().count() > width {
        match rest.split_once('.') {
            Some((_, tail)) => {
                rest = tail;
                dropped += 1;
            }
            None => break,
        }
    }
    format!("{}{}", ".".repeat(dropped), rest)
}

/// Build a report for an already classified namespace.
pub fn build_report(classification: &Classification, options: &SummaryOptions) -> Report {
    let sections = options
        .sections()
        .into_iter()
        .map(|section| match section {
            Section::Title => ReportSection::Title(title_block(classification)),
            Section::Category(category) => {
                ReportSection::Table(table_section(classification, category, options))
            }
        })
        .collect();
    Report { sections }
}

fn title_block(classification: &Classification) -> TitleBlock {
    TitleBlock {
        name: classification.namespace_name().map(str::to_string),
        total: classification.total(),
        counts: classification
            .counts()
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
    }
}

fn table_section(
    classification: &Classification,
    category: Category,
    options: &SummaryOptions,
) -> TableSection {
    let bucket = classification.bucket(category);
    let members = bucket
        .iter()
        .map(|(binding, value)| (Classification::label(category, binding, value), value));

    let (labels, rows, compaction) = match category {
        Category::InternalModules | Category::ExternalModules => {
            let mut rows: Vec<Vec<String>> = members
                .map(|(label, value)| vec![label.to_string(), doc_cell(value.doc())])
                .collect();
            rows.sort();
            let compaction = if category == Category::InternalModules {
                Compaction::Dense
            } else {
                Compaction::Ruled
            };
            (vec!["module", "description"], rows, compaction)
        }
        Category::Functions => {
            let namespace = classification.namespace_name();
            let rows = members
                .map(|(label, value)| {
                    vec![
                        function_module_cell(value, namespace, options),
                        label.to_string(),
                        doc_cell(value.doc()),
                    ]
                })
                .collect();
            (vec!["module", "function", "description"], rows, Compaction::Dense)
        }
        Category::Classes | Category::Exceptions => {
            let rows = members
                .map(|(label, value)| vec![label.to_string(), doc_cell(value.doc())])
                .collect();
            let label = if category == Category::Classes {
                "class"
            } else {
                "exception"
            };
            (vec![label, "description"], rows, Compaction::Dense)
        }
        Category::Dunder | Category::Other => {
            let rows = members
                .map(|(label, value)| vec![label.to_string(), value.type_descriptor().to_string()])
                .collect();
            (vec!["name", "type"], rows, Compaction::Dense)
        }
    };

    TableSection {
        category,
        justify: vec![Justify::Left; labels.len()],
        labels,
        rows,
        compaction,
    }
}

fn function_module_cell(value: &Value, namespace: Option<&str>, options: &SummaryOptions) -> String {
    let module = match value {
        Value::Callable(c) => c.module.as_deref(),
        _ => None,
    };
    let path = relative_module_path(module, namespace);
    if options.verbose {
        path
    } else {
        truncate_module_path(&path, options.module_path_width)
    }
}

fn column_styles(category: Category, theme: &Theme) -> Vec<Style> {
    match category {
        Category::Functions => vec![theme.option, theme.description, theme.comment],
        Category::Dunder | Category::Other => vec![theme.option, theme.description],
        _ => vec![theme.option, theme.comment],
    }
}

/// Write a report as boxed headings and tables.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &Report,
    max_width: usize,
    theme: &Theme,
) -> std::io::Result<()> {
    for (i, section) in report.sections.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        match section {
            ReportSection::Title(title) => {
                write!(out, "{}", text_box(&title.heading(), theme.title))?;
                writeln!(out)?;
                write!(
                    out,
                    "{}",
                    bullet("items in module namespace:", &format_number(title.total), "", theme)
                )?;
                for count in &title.counts {
                    let key = format!("{}:", count.category);
                    write!(out, "{}", bullet(&key, &format_number(count.count), "─", theme))?;
                }
            }
            ReportSection::Table(table) => {
                write!(out, "{}", text_box(table.category.title(), theme.title))?;
                let rendered = Table::new(
                    table.labels.iter().map(|l| l.to_string()).collect(),
                    table.rows.clone(),
                    theme,
                )
                .justify(table.justify.clone())
                .column_styles(column_styles(table.category, theme))
                .compaction(table.compaction)
                .max_width(max_width)
                .render();
                write!(out, "{rendered}")?;
            }
        }
    }
    Ok(())
}

/// Write a report as pretty-printed JSON.
pub fn write_report_json<W: Write>(out: &mut W, report: &Report) -> Result<(), SummaryError> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Normalize, classify and render a namespace summary.
pub fn render_summary<W: Write>(
    out: &mut W,
    namespace: NamespaceLike<'_>,
    options: &SummaryOptions,
    theme: &Theme,
) -> Result<(), SummaryError> {
    let namespace = normalize(namespace)?;
    let classification = classify(&namespace);
    let report = build_report(&classification, options);
    let max_width = options.max_width.unwrap_or_else(terminal_width);
    write_report(out, &report, max_width, theme)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespace;
    use crate::value::{CallableRef, ModuleRef, ObjectRef, TypeRef};
    use pretty_assertions::assert_eq;

    fn pkg() -> Namespace {
        Namespace::new()
            .with("__name__", ObjectRef::string("pkg"))
            .with(
                "zeta",
                ModuleRef::named("pkg.zeta").with_doc(Docstring::text("\n    Zeta tools.\n")),
            )
            .with("alpha", ModuleRef::named("pkg.alpha"))
            .with("json", ModuleRef::named("json").with_doc(Docstring::text("JSON encoder")))
            .with(
                "mean",
                CallableRef::function("mean", "pkg.stats.descriptive.central_tendency")
                    .with_doc(Docstring::text("Arithmetic mean.\n\nLonger text.")),
            )
            .with("top", CallableRef::function("top", "pkg"))
            .with("Frame", TypeRef::class("Frame").with_doc(Docstring::Raw("42".into())))
            .with("FrameError", TypeRef::exception("FrameError"))
            .with("VERSION", ObjectRef::string("1.0"))
    }

    fn table(report: &Report, category: Category) -> &TableSection {
        report
            .sections
            .iter()
            .find_map(|s| match s {
                ReportSection::Table(t) if t.category == category => Some(t),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_process_docstring() {
        assert_eq!(
            process_docstring(Some("===\nFirst real line\nmore")).as_deref(),
            Some("First real line")
        );
        assert_eq!(process_docstring(Some("===\n===\n")).as_deref(), Some(""));
        assert_eq!(process_docstring(None), None);
        assert_eq!(
            process_docstring(Some("\n    Indented summary.\n    More.")).as_deref(),
            Some("Indented summary.")
        );
        assert_eq!(process_docstring(Some("")).as_deref(), Some(""));
    }

    #[test]
    fn test_doc_cell_degrades_to_raw() {
        assert_eq!(doc_cell(&Docstring::Missing), "");
        assert_eq!(doc_cell(&Docstring::Raw("<property>".into())), "<property>");
    }

    #[test]
    fn test_relative_module_path() {
        assert_eq!(relative_module_path(Some("pkg.sub.leaf"), Some("pkg")), ".sub.leaf");
        assert_eq!(relative_module_path(Some("pkg"), Some("pkg")), "");
        assert_eq!(relative_module_path(Some("other.mod"), Some("pkg")), "other.mod");
        assert_eq!(relative_module_path(Some("other.mod"), None), "other.mod");
        assert_eq!(relative_module_path(None, Some("pkg")), "");
    }

    #[test]
    fn test_truncate_short_paths_untouched() {
        let path = ".linalg.linalg";
        assert_eq!(truncate_module_path(path, 25), path);
        let exact = "a".repeat(25);
        assert_eq!(truncate_module_path(&exact, 25), exact);
    }

    #[test]
    fn test_truncate_long_path() {
        let path = ".stats.descriptive.central_tendency";
        assert_eq!(truncate_module_path(path, 25), "..central_tendency");

        let path = "core.multiarray.sub.deep.thing.more";
        let truncated = truncate_module_path(path, 25);
        assert_eq!(truncated, "..sub.deep.thing.more");
        assert!(path.ends_with(truncated.trim_start_matches('.')));
    }

    #[test]
    fn test_truncate_single_long_segment() {
        let path = format!(".{}", "x".repeat(30));
        assert_eq!(truncate_module_path(&path, 25), "x".repeat(30));
    }

    #[test]
    fn test_default_sections() {
        let report = build_report(&classify(&pkg()), &SummaryOptions::default());
        assert_eq!(report.sections.len(), 8);
        assert!(matches!(report.sections[0], ReportSection::Title(_)));
    }

    #[test]
    fn test_sections_follow_requested_order() {
        let options = SummaryOptions {
            sections: Some(vec![
                Section::Category(Category::Other),
                Section::Title,
                Section::Category(Category::Functions),
            ]),
            ..Default::default()
        };
        let report = build_report(&classify(&pkg()), &options);
        let kinds: Vec<_> = report
            .sections
            .iter()
            .map(|s| match s {
                ReportSection::Title(_) => "title".to_string(),
                ReportSection::Table(t) => t.category.to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["other", "title", "functions"]);
    }

    #[test]
    fn test_title_counts_every_category() {
        let options = SummaryOptions {
            sections: Some(vec![Section::Title]),
            ..Default::default()
        };
        let report = build_report(&classify(&pkg()), &options);
        let ReportSection::Title(title) = &report.sections[0] else {
            panic!("expected title");
        };
        assert_eq!(title.name.as_deref(), Some("pkg"));
        assert_eq!(title.total, 9);
        let counts: Vec<_> = title.counts.iter().map(|c| (c.category, c.count)).collect();
        assert_eq!(
            counts,
            vec![
                (Category::InternalModules, 2),
                (Category::ExternalModules, 1),
                (Category::Functions, 2),
                (Category::Classes, 1),
                (Category::Exceptions, 1),
                (Category::Dunder, 1),
                (Category::Other, 1),
            ]
        );
    }

    #[test]
    fn test_module_rows() {
        let report = build_report(&classify(&pkg()), &SummaryOptions::default());
        assert_eq!(
            table(&report, Category::InternalModules).rows,
            vec![
                vec!["pkg.alpha".to_string(), String::new()],
                vec!["pkg.zeta".to_string(), "Zeta tools.".to_string()],
            ]
        );
        assert_eq!(
            table(&report, Category::ExternalModules).rows,
            vec![vec!["json".to_string(), "JSON encoder".to_string()]]
        );
    }

    #[test]
    fn test_function_rows_truncate_unless_verbose() {
        let report = build_report(&classify(&pkg()), &SummaryOptions::default());
        assert_eq!(
            table(&report, Category::Functions).rows,
            vec![
                vec![
                    "..central_tendency".to_string(),
                    "mean".to_string(),
                    "Arithmetic mean.".to_string()
                ],
                vec![String::new(), "top".to_string(), String::new()],
            ]
        );

        let verbose = SummaryOptions {
            verbose: true,
            ..Default::default()
        };
        let report = build_report(&classify(&pkg()), &verbose);
        assert_eq!(
            table(&report, Category::Functions).rows[0][0],
            ".stats.descriptive.central_tendency"
        );
    }

    #[test]
    fn test_class_and_other_rows() {
        let report = build_report(&classify(&pkg()), &SummaryOptions::default());
        assert_eq!(
            table(&report, Category::Classes).rows,
            vec![vec!["Frame".to_string(), "42".to_string()]]
        );
        assert_eq!(table(&report, Category::Classes).labels, vec!["class", "description"]);
        assert_eq!(
            table(&report, Category::Other).rows,
            vec![vec!["VERSION".to_string(), "str".to_string()]]
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let render = || {
            let mut out = Vec::new();
            let options = SummaryOptions {
                max_width: Some(100),
                ..Default::default()
            };
            render_summary(&mut out, NamespaceLike::Mapping(&pkg()), &options, &Theme::plain())
                .unwrap();
            String::from_utf8(out).unwrap()
        };
        let first = render();
        assert_eq!(first, render());
        assert!(first.contains("Namespace Summary for pkg"));
        assert!(first.contains("items in module namespace: 9"));
        assert!(first.contains("─ internal_modules: 2"));
        assert!(first.contains("│ Internal Modules │"));
    }

    #[test]
    fn test_unnamed_title() {
        let mut out = Vec::new();
        let ns = Namespace::new().with("x", ObjectRef::of_type("int"));
        let options = SummaryOptions {
            sections: Some(vec![Section::Title]),
            max_width: Some(80),
            ..Default::default()
        };
        render_summary(&mut out, NamespaceLike::Mapping(&ns), &options, &Theme::plain()).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Namespace Summary for [unnamed]"));
    }

    #[test]
    fn test_render_rejects_non_namespace() {
        let mut out = Vec::new();
        let value = Value::from(ObjectRef::of_type("int"));
        let err = render_summary(
            &mut out,
            NamespaceLike::Value(&value),
            &SummaryOptions::default(),
            &Theme::plain(),
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::Namespace(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_json_report() {
        let options = SummaryOptions {
            sections: Some(vec![Section::Title, Section::Category(Category::Exceptions)]),
            ..Default::default()
        };
        let report = build_report(&classify(&pkg()), &options);
        let mut out = Vec::new();
        write_report_json(&mut out, &report).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let sections = v["sections"].as_array().unwrap();
        assert_eq!(sections[0]["section"], "title");
        assert_eq!(sections[0]["total"], 9);
        assert_eq!(sections[1]["section"], "table");
        assert_eq!(sections[1]["category"], "exceptions");
        assert_eq!(sections[1]["rows"][0][0], "FrameError");
    }

    #[test]
    fn test_section_parse() {
        assert_eq!("title".parse::<Section>().unwrap(), Section::Title);
        assert_eq!(
            "dunder".parse::<Section>().unwrap(),
            Section::Category(Category::Dunder)
        );
        assert!("modules".parse::<Section>().is_err());
    }
}
