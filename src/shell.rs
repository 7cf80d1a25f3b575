//! Shell helpers that must live in the user's shell config.
//!
//! Changing directory from a subprocess does not affect the parent shell, so
//! these are printed for the user to append to their profile instead of
//! being run by `td` itself.

/// Functions and aliases to add to a shell profile.
pub const SHELL_CONFIG: &str = r#"
# add this content to your shell config
# e.g. `td shell 1>> ~/.profile`

alias lsp="td lsp"
alias pwp="td pwp"

function gcd () { cd $(git rev-parse --show-toplevel); }
function cdg () { cd $(git rev-parse --show-toplevel); }
function pcd () { cd $(realpath $(python3 -c "import $1; print($1.__path__[0])")); }
function cdp () { cd $(realpath $(python3 -c "import $1; print($1.__path__[0])")); }

function importtime() {
    python3 -X importtime -c "import $1" 2>/tmp/tuna.log;
    tuna /tmp/tuna.log;
}

function pdep () {
    echo "Dependency tree"
    echo ""
    pipdeptree -w silence -p $1
    echo ""
    echo ""
    echo "Unique dependencies"
    pipdeptree -w silence -p $1 | awk -v col=2 '{print tolower($col)}' | sort | uniq
    echo ""
    echo "Total unique dependencies:" $(pipdeptree -w silence -p $1 | awk -v col=2 '{print tolower($col)}' | sort | uniq | wc -l)
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defines_aliases_and_functions() {
        for needle in ["alias lsp=", "alias pwp=", "function gcd", "function pcd", "function pdep"] {
            assert!(SHELL_CONFIG.contains(needle), "missing {needle}");
        }
    }
}
