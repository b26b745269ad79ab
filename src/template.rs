//! Template rendering: the [`TemplateRenderer`] seam and the bundled [`MavTemplate`].
//!
//! A template is text with two markers:
//!
//! - `${key}` is replaced by the text value `key`.
//! - `${{key: body}}` renders `body` once per item of the list `key`. Inside the body, keys are
//!   looked up on the current item first, then on the enclosing contexts.
//!
//! ```text
//! enum ${name} {${{entry: ${name}=${value},}}}
//! ```

use pest::Parser;
use pest_derive::Parser as PestParser;
use std::collections::BTreeMap;

#[derive(PestParser)]
#[grammar = "template.pest"]
struct TemplateParser;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Missing key: {0}")]
    MissingKey(String),
    #[error("Key {0} is text, a repeat block needs a list")]
    NotAList(String),
    #[error("Key {0} is a list, a substitution needs text")]
    NotText(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Text(String),
    List(Vec<Context>),
}

/// Values a template is rendered against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values
            .insert(key.into(), ContextValue::Text(value.to_string()));
        self
    }

    pub fn set_list(&mut self, key: impl Into<String>, items: Vec<Context>) -> &mut Self {
        self.values.insert(key.into(), ContextValue::List(items));
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_list(mut self, key: impl Into<String>, items: Vec<Context>) -> Self {
        self.set_list(key, items);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }
}

/// Turns a template and a populated context into output text.
pub trait TemplateRenderer {
    fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError>;
}

/// Renderer for the `${key}` / `${{key: body}}` syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct MavTemplate;

impl TemplateRenderer for MavTemplate {
    fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let nodes = parse(template)?;
        let mut out = String::with_capacity(template.len());
        let mut scopes = vec![context];
        render_nodes(&nodes, &mut scopes, &mut out)?;
        Ok(out)
    }
}

#[derive(Debug, PartialEq)]
enum Node<'t> {
    Text(&'t str),
    Subst(&'t str),
    Repeat { key: &'t str, body: Vec<Node<'t>> },
}

fn parse(template: &str) -> Result<Vec<Node<'_>>, TemplateError> {
    let pairs = TemplateParser::parse(Rule::template, template)
        .map_err(|e| TemplateError::Parse(e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| TemplateError::Parse("empty parse".to_string()))?;
    build_nodes(pair.into_inner())
}

fn build_nodes(pairs: pest::iterators::Pairs<'_, Rule>) -> Result<Vec<Node<'_>>, TemplateError> {
    let mut nodes = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::text => nodes.push(Node::Text(pair.as_str())),
            Rule::subst => {
                let ident = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| TemplateError::Parse("substitution without key".to_string()))?;
                nodes.push(Node::Subst(ident.as_str()));
            }
            Rule::repeat => {
                let mut it = pair.into_inner();
                let key = it
                    .next()
                    .ok_or_else(|| TemplateError::Parse("repeat without key".to_string()))?;
                let body = it
                    .next()
                    .ok_or_else(|| TemplateError::Parse("repeat without body".to_string()))?;
                nodes.push(Node::Repeat {
                    key: key.as_str(),
                    body: build_nodes(body.into_inner())?,
                });
            }
            _ => {}
        }
    }
    Ok(nodes)
}

fn lookup<'c>(scopes: &[&'c Context], key: &str) -> Option<&'c ContextValue> {
    scopes.iter().rev().find_map(|c| c.get(key))
}

fn render_nodes<'c>(
    nodes: &[Node<'_>],
    scopes: &mut Vec<&'c Context>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Subst(key) => match lookup(scopes, key) {
                Some(ContextValue::Text(s)) => out.push_str(s),
                Some(ContextValue::List(_)) => return Err(TemplateError::NotText(key.to_string())),
                None => return Err(TemplateError::MissingKey(key.to_string())),
            },
            Node::Repeat { key, body } => {
                let items = match lookup(scopes, key) {
                    Some(ContextValue::List(items)) => items,
                    Some(ContextValue::Text(_)) => return Err(TemplateError::NotAList(key.to_string())),
                    None => return Err(TemplateError::MissingKey(key.to_string())),
                };
                for item in items {
                    scopes.push(item);
                    let rendered = render_nodes(body, scopes, out);
                    scopes.pop();
                    rendered?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, ctx: &Context) -> Result<String, TemplateError> {
        MavTemplate.render(template, ctx)
    }

    #[test]
    fn plain_text_passes_through() {
        let out = render("public struct X\n{\n};\n", &Context::new()).unwrap();
        assert_eq!(out, "public struct X\n{\n};\n");
    }

    #[test]
    fn substitution() {
        let ctx = Context::new().with("name", "HEARTBEAT").with("id", 0);
        assert_eq!(render("${name} = ${id},", &ctx).unwrap(), "HEARTBEAT = 0,");
    }

    #[test]
    fn repeat_with_outer_lookup() {
        let ctx = Context::new().with("prefix", "M.").with_list(
            "items",
            vec![Context::new().with("name", "a"), Context::new().with("name", "b")],
        );
        assert_eq!(render("${{items:${prefix}${name};}}", &ctx).unwrap(), "M.a;M.b;");
    }

    #[test]
    fn nested_repeat_shadows_outer_keys() {
        let entry = Context::new()
            .with("description", "entry")
            .with_list(
                "param",
                vec![Context::new().with("description", "p1"), Context::new().with("description", "p2")],
            );
        let ctx = Context::new().with_list("entry", vec![entry]);
        let out = render("${{entry:${description} |${{param:${description}| }}}}", &ctx).unwrap();
        assert_eq!(out, "entry |p1| p2| ");
    }

    #[test]
    fn empty_list_renders_nothing() {
        let ctx = Context::new().with_list("items", Vec::new());
        assert_eq!(render("[${{items:x}}]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn missing_key() {
        let err = render("${nope}", &Context::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingKey(ref k) if k == "nope"));
    }

    #[test]
    fn kind_mismatches() {
        let ctx = Context::new().with("t", "x").with_list("l", Vec::new());
        assert!(matches!(render("${{t:a}}", &ctx), Err(TemplateError::NotAList(_))));
        assert!(matches!(render("${l}", &ctx), Err(TemplateError::NotText(_))));
    }

    #[test]
    fn unterminated_repeat_is_a_parse_error() {
        let ctx = Context::new().with_list("l", Vec::new());
        assert!(matches!(render("${{l: body", &ctx), Err(TemplateError::Parse(_))));
    }
}
