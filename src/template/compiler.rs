//! URI template compilation.
//!
//! # Responsibilities
//! - Parse literal text and `{name}` / `{name:regex}` variables
//! - Percent-encode literal characters that may not appear in a path
//! - Build an anchored regex with one group per variable plus a final group
//! - Count literal characters and capturing groups for specificity ordering
//!
//! # Design Decisions
//! - A leading `/` is ignored; a trailing `/` is implied before the final group
//! - Matrix parameters (`;`) are rejected in templates
//! - Variable regexes may contain balanced braces (`{id:[0-9]{3}}`)

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Peekable;
use std::str::CharIndices;

use regex::Regex;
use thiserror::Error;

/// Regex used for a variable declared without one.
pub const DEFAULT_VARIABLE_REGEX: &str = "[^/]+?";

pub(crate) const FINAL_GROUP: &str = "final";

/// Errors raised while compiling a URI template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no closing '}}' for the '{{' at position {position} of \"{template}\"")]
    UnclosedVariable { template: String, position: usize },

    #[error("'}}' at position {position} of \"{template}\" does not close a variable")]
    UnexpectedCloseBrace { template: String, position: usize },

    #[error("nested '{{' at position {position} of \"{template}\"")]
    NestedOpenBrace { template: String, position: usize },

    #[error("empty variable name at position {position} of \"{template}\"")]
    EmptyVariableName { template: String, position: usize },

    #[error("unexpected character at position {position} of \"{template}\", expected ':' or '}}'")]
    InvalidVariableCharacter { template: String, position: usize },

    #[error("matrix parameters are not allowed in a template: \"{template}\"")]
    MatrixParameter { template: String },

    #[error("malformed percent-encoding at position {position} of \"{template}\"")]
    InvalidPercentEncoding { template: String, position: usize },

    #[error("character {character:?} at position {position} of \"{template}\" must be percent-encoded")]
    UnencodedCharacter {
        template: String,
        position: usize,
        character: char,
    },

    #[error("invalid regex for variable '{name}' in \"{template}\": {message}")]
    InvalidRegex {
        template: String,
        name: String,
        message: String,
    },
}

/// Result type for template compilation.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Compilation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Percent-encode characters that may not appear literally in a path.
    /// When disabled such characters are rejected.
    pub encode: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self { encode: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable(String),
}

/// A compiled URI template.
///
/// Two templates are equal when they compile to the same regex, which makes
/// `/a/{x}` and `/a/{y}` the same route.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    source: String,
    normalised: String,
    pattern: Regex,
    parts: Vec<Part>,
    variables: Vec<String>,
    group_names: Vec<String>,
    literal_chars: usize,
    non_default_groups: usize,
}

impl PathTemplate {
    /// The template as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The template with one leading `/` and no trailing `/`.
    pub fn as_str(&self) -> &str {
        &self.normalised
    }

    /// The compiled regex.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Variable names in declaration order. Names may repeat.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn literal_character_count(&self) -> usize {
        self.literal_chars
    }

    /// Variables plus the implicit final group.
    pub fn capturing_group_count(&self) -> usize {
        self.variables.len() + 1
    }

    /// Variables declared with an explicit regex other than the default.
    pub fn non_default_group_count(&self) -> usize {
        self.non_default_groups
    }

    /// Sort key for specificity: more literal characters first, then more
    /// capturing groups.
    pub fn specificity(&self) -> (usize, usize) {
        (self.literal_chars, self.capturing_group_count())
    }

    /// True for the templates `""` and `"/"`.
    pub fn is_empty_or_slash(&self) -> bool {
        self.parts.is_empty()
            || matches!(self.parts.as_slice(), [Part::Literal(l)] if l == "/")
    }

    /// Build a path from this template, inserting values verbatim.
    ///
    /// Returns `None` when `value_of` has no value for a variable.
    pub fn expand<F, S>(&self, mut value_of: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<S>,
        S: AsRef<str>,
    {
        let mut path = String::from("/");
        for part in &self.parts {
            match part {
                Part::Literal(literal) => path.push_str(literal),
                Part::Variable(name) => path.push_str(value_of(name)?.as_ref()),
            }
        }
        Some(path)
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn group_names(&self) -> &[String] {
        &self.group_names
    }
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str()
    }
}

impl Eq for PathTemplate {}

impl Hash for PathTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.as_str().hash(state);
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalised)
    }
}

/// Compile a template with default options (encoding enabled).
pub fn compile(template: &str) -> TemplateResult<PathTemplate> {
    compile_with(template, TemplateOptions::default())
}

/// Compile a template.
pub fn compile_with(template: &str, options: TemplateOptions) -> TemplateResult<PathTemplate> {
    let body = template.strip_prefix('/').unwrap_or(template);
    let offset = template.len() - body.len();
    let mut builder = Builder::new(template);
    let mut chars = body.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let position = offset + index;
        match c {
            '{' => {
                let (name, regex) = parse_variable(template, offset, index, &mut chars)?;
                builder.variable(name, regex)?;
            }
            '}' => {
                return Err(TemplateError::UnexpectedCloseBrace {
                    template: template.to_string(),
                    position,
                })
            }
            ';' => {
                return Err(TemplateError::MatrixParameter {
                    template: template.to_string(),
                })
            }
            '%' => {
                let escape = body
                    .get(index + 1..index + 3)
                    .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()));
                match escape {
                    Some(hex) => {
                        builder.literal.push('%');
                        builder.literal.push_str(&hex.to_ascii_uppercase());
                        builder.literal_chars += 3;
                        chars.next();
                        chars.next();
                    }
                    None if options.encode => builder.push_encoded(c),
                    None => {
                        return Err(TemplateError::InvalidPercentEncoding {
                            template: template.to_string(),
                            position,
                        })
                    }
                }
            }
            c if is_path_char(c) => {
                builder.literal.push(c);
                builder.literal_chars += 1;
            }
            c if options.encode => builder.push_encoded(c),
            c => {
                return Err(TemplateError::UnencodedCharacter {
                    template: template.to_string(),
                    position,
                    character: c,
                })
            }
        }
    }

    builder.finish(body)
}

/// Unreserved characters, sub-delimiters (minus `;`), `:`, `@` and `/`.
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '='
                | ':' | '@' | '/'
        )
}

/// Reads a variable body after its `{`, consuming the closing `}`.
fn parse_variable(
    template: &str,
    offset: usize,
    open: usize,
    chars: &mut Peekable<CharIndices<'_>>,
) -> TemplateResult<(String, Option<String>)> {
    let mut name = String::new();
    let mut name_done = false;
    let mut regex: Option<String> = None;
    let mut depth = 0usize;

    for (index, c) in chars.by_ref() {
        if let Some(expr) = regex.as_mut() {
            match c {
                '{' => {
                    depth += 1;
                    expr.push(c);
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    expr.push(c);
                }
                '}' => {
                    let expr = expr.trim();
                    let custom = (!expr.is_empty() && expr != DEFAULT_VARIABLE_REGEX)
                        .then(|| expr.to_string());
                    return Ok((name, custom));
                }
                _ => expr.push(c),
            }
            continue;
        }

        match c {
            '}' | ':' if name.is_empty() => {
                return Err(TemplateError::EmptyVariableName {
                    template: template.to_string(),
                    position: offset + open,
                })
            }
            '}' => return Ok((name, None)),
            ':' => regex = Some(String::new()),
            '{' => {
                return Err(TemplateError::NestedOpenBrace {
                    template: template.to_string(),
                    position: offset + index,
                })
            }
            c if c.is_whitespace() => name_done = !name.is_empty(),
            _ if name_done => {
                return Err(TemplateError::InvalidVariableCharacter {
                    template: template.to_string(),
                    position: offset + index,
                })
            }
            c => name.push(c),
        }
    }

    Err(TemplateError::UnclosedVariable {
        template: template.to_string(),
        position: offset + open,
    })
}

struct Builder<'a> {
    template: &'a str,
    regex: String,
    literal: String,
    parts: Vec<Part>,
    variables: Vec<String>,
    group_names: Vec<String>,
    literal_chars: usize,
    non_default_groups: usize,
}

impl<'a> Builder<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            template,
            regex: String::from("^"),
            literal: String::new(),
            parts: Vec::new(),
            variables: Vec::new(),
            group_names: Vec::new(),
            literal_chars: 0,
            non_default_groups: 0,
        }
    }

    fn push_encoded(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        for byte in c.encode_utf8(&mut utf8).bytes() {
            self.literal.push_str(&format!("%{byte:02X}"));
            self.literal_chars += 3;
        }
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.regex.push_str(&regex::escape(&self.literal));
            self.parts.push(Part::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn variable(&mut self, name: String, custom: Option<String>) -> TemplateResult<()> {
        self.flush_literal();

        if let Some(expr) = &custom {
            Regex::new(expr).map_err(|e| TemplateError::InvalidRegex {
                template: self.template.to_string(),
                name: name.clone(),
                message: e.to_string(),
            })?;
            self.non_default_groups += 1;
        }

        let group = format!("v{}", self.variables.len());
        let expr = custom.as_deref().unwrap_or(DEFAULT_VARIABLE_REGEX);
        self.regex.push_str(&format!("(?P<{group}>{expr})"));
        self.group_names.push(group);
        self.parts.push(Part::Variable(name.clone()));
        self.variables.push(name);
        Ok(())
    }

    fn finish(mut self, body: &str) -> TemplateResult<PathTemplate> {
        self.flush_literal();
        if !body.is_empty() && !body.ends_with('/') {
            self.regex.push('/');
        }
        self.regex.push_str(&format!("(?P<{FINAL_GROUP}>.*)$"));

        let pattern = Regex::new(&self.regex).map_err(|e| TemplateError::InvalidRegex {
            template: self.template.to_string(),
            name: FINAL_GROUP.to_string(),
            message: e.to_string(),
        })?;

        let trimmed = body.trim_end_matches('/');
        Ok(PathTemplate {
            source: self.template.to_string(),
            normalised: format!("/{trimmed}"),
            pattern,
            parts: self.parts,
            variables: self.variables,
            group_names: self.group_names,
            literal_chars: self.literal_chars,
            non_default_groups: self.non_default_groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specificity_counts() {
        let literal = compile("/a/b").unwrap();
        assert_eq!(literal.literal_character_count(), 3);
        assert_eq!(literal.capturing_group_count(), 1);

        let variable = compile("/a/{x}").unwrap();
        assert_eq!(variable.literal_character_count(), 2);
        assert_eq!(variable.capturing_group_count(), 2);
        assert!(literal.specificity() > variable.specificity());
    }

    #[test]
    fn test_leading_slash_ignored() {
        assert_eq!(compile("a/{x}").unwrap(), compile("/a/{x}").unwrap());
        assert_eq!(compile("a").unwrap().as_str(), "/a");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(compile("/a/{x}").unwrap(), compile("/a/{y}").unwrap());
        assert_ne!(compile("/a/{x}").unwrap(), compile("/a/{x:\\d+}").unwrap());
    }

    #[test]
    fn test_empty_or_slash() {
        assert!(compile("").unwrap().is_empty_or_slash());
        assert!(compile("/").unwrap().is_empty_or_slash());
        assert!(!compile("/a").unwrap().is_empty_or_slash());
    }

    #[test]
    fn test_custom_regex() {
        let t = compile("/items/{ id : [0-9]{3} }").unwrap();
        assert_eq!(t.variables(), ["id".to_string()]);
        assert_eq!(t.non_default_group_count(), 1);

        let default = compile("/items/{id:[^/]+?}").unwrap();
        assert_eq!(default.non_default_group_count(), 0);
    }

    #[test]
    fn test_encoding() {
        let t = compile("/hello world").unwrap();
        assert_eq!(t.literal_character_count(), "hello".len() + 3 + "world".len());
        assert!(t.pattern().contains("%20"));

        let escaped = compile("/a%2fb").unwrap();
        assert_eq!(escaped.literal_character_count(), 5);
        assert!(escaped.pattern().contains("%2F"));
    }

    #[test]
    fn test_encoding_disabled() {
        let options = TemplateOptions { encode: false };
        assert!(matches!(
            compile_with("/hello world", options),
            Err(TemplateError::UnencodedCharacter { character: ' ', .. })
        ));
        assert!(matches!(
            compile_with("/100%", options),
            Err(TemplateError::InvalidPercentEncoding { .. })
        ));
        assert!(compile_with("/a%20b", options).is_ok());
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(compile("/a/{x"), Err(TemplateError::UnclosedVariable { .. })));
        assert!(matches!(compile("/a/x}"), Err(TemplateError::UnexpectedCloseBrace { .. })));
        assert!(matches!(compile("/a/{x{y}}"), Err(TemplateError::NestedOpenBrace { .. })));
        assert!(matches!(compile("/a/{}"), Err(TemplateError::EmptyVariableName { .. })));
        assert!(matches!(compile("/a/{ :x}"), Err(TemplateError::EmptyVariableName { .. })));
        assert!(matches!(compile("/a/{x y}"), Err(TemplateError::InvalidVariableCharacter { .. })));
        assert!(matches!(compile("/a;v=1"), Err(TemplateError::MatrixParameter { .. })));
        assert!(matches!(compile("/a/{x:(}"), Err(TemplateError::InvalidRegex { .. })));
    }

    #[test]
    fn test_expand() {
        let t = compile("/users/{id}/posts/{slug}").unwrap();
        let expanded = t.expand(|name| match name {
            "id" => Some("42"),
            "slug" => Some("hello"),
            _ => None,
        });
        assert_eq!(expanded.as_deref(), Some("/users/42/posts/hello"));
        assert_eq!(t.expand(|_| None::<&str>), None);
    }
}
