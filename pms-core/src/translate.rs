use pms_model::naming::snake_case;

// Array of strict keywords (currently in use)
const STRICT_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

// Array of reserved keywords (for future use)
const RESERVED_KEYWORDS: &[&str] = &[
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "typeof",
    "unsized", "virtual", "yield",
];

// Names the generated wrapper struct already uses for its own methods
const WRAPPER_METHODS: &[&str] = &["new", "client"];

fn avoid_reserved(s: &str) -> String {
    if STRICT_KEYWORDS
        .iter()
        .chain(RESERVED_KEYWORDS.iter())
        .chain(WRAPPER_METHODS.iter())
        .any(|e| (*e).eq(s))
    {
        s.to_string() + "_"
    } else {
        s.to_string()
    }
}

/// Turns REST paths into operation names, used when a document operation
/// has no `operationId`.
/// For instance, GET /api/task/task/{id}/ becomes api_task_task_id_get, so '/' is
/// replaced by underscore '_'. Non-identifier characters like '{', '}', '$' are
/// replaced as well. Leading and consecutive underscores are eliminated.
pub(crate) fn path_method_to_operation_name(method: &http::Method, path: &str) -> String {
    let method_str = method.as_str().to_lowercase();

    let cleaned_path = path
        .strip_prefix('/')
        .unwrap_or(path)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if cleaned_path.is_empty() {
        method_str
    } else {
        format!("{}_{}", cleaned_path, method_str)
    }
}

/// Rust function name for an operation name. Operation ids from the PMS
/// backend (`message_create`, `users_partial_update`) pass through unchanged.
pub(crate) fn operation_to_rust_fn_name(operation: &str) -> String {
    let mut name = snake_case(operation);
    if name.is_empty() {
        name = "operation".to_string();
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("op_{name}");
    }
    avoid_reserved(&name)
}
