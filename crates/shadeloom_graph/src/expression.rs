//! Custom GLSL expressions with positional placeholders.
//!
//! `'0'`, `'1'`, ... inside the source are replaced by the generated
//! expression of the matching input. GLSL has no character literals, so the
//! single quote is free to act as the placeholder delimiter.
//!
//! ```rust,ignore
//! let expr = CustomExpression::new("'0' * 0.5 + '1'", VectorType::Vec3)
//!     .input(normal)
//!     .input(0.5_f32);
//! let line = graph.custom_expression(expr)?;
//! ```

use shadeloom_core::{GraphError, Result, VectorType};

use crate::line::DataLine;

/// Request for a custom expression node.
#[derive(Debug, Clone)]
pub struct CustomExpression {
    source: String,
    output: VectorType,
    inputs: Vec<DataLine>,
    allow_unused: bool,
}

impl CustomExpression {
    #[must_use]
    pub fn new(source: impl Into<String>, output: VectorType) -> Self {
        Self {
            source: source.into(),
            output,
            inputs: Vec::new(),
            allow_unused: false,
        }
    }

    /// Appends the input referenced by the next placeholder index.
    #[must_use]
    pub fn input(mut self, line: impl Into<DataLine>) -> Self {
        self.inputs.push(line.into());
        self
    }

    #[must_use]
    pub fn inputs(mut self, lines: impl IntoIterator<Item = DataLine>) -> Self {
        self.inputs.extend(lines);
        self
    }

    /// Accepts inputs that no placeholder references.
    #[must_use]
    pub fn allow_unused_inputs(mut self) -> Self {
        self.allow_unused = true;
        self
    }

    pub(crate) fn into_parts(self) -> Result<(ExpressionTemplate, Vec<DataLine>)> {
        let template = ExpressionTemplate::parse(&self.source, self.output)?;

        let mut used = vec![false; self.inputs.len()];
        for index in template.placeholders() {
            let slot = used
                .get_mut(index)
                .ok_or(GraphError::PlaceholderOutOfRange {
                    placeholder: index,
                    inputs: self.inputs.len(),
                })?;
            *slot = true;
        }

        if !self.allow_unused
            && let Some(unused) = used.iter().position(|&u| !u)
        {
            return Err(GraphError::UnusedExpressionInput(unused));
        }

        Ok((template, self.inputs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Text(String),
    Input(usize),
}

/// Parsed expression source, ready for substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionTemplate {
    segments: Vec<Segment>,
    output: VectorType,
}

impl ExpressionTemplate {
    /// Splits `source` into literal text and placeholder references.
    pub fn parse(source: &str, output: VectorType) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('\'') {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('\'').ok_or_else(|| {
                GraphError::MalformedExpression(format!("unterminated placeholder in \"{source}\""))
            })?;
            let digits = &after[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(GraphError::MalformedExpression(format!(
                    "placeholder '{digits}' is not an input index"
                )));
            }
            let index = digits.parse().map_err(|_| {
                GraphError::MalformedExpression(format!("placeholder '{digits}' is too large"))
            })?;
            segments.push(Segment::Input(index));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        if segments.is_empty() {
            return Err(GraphError::MalformedExpression("empty expression".to_string()));
        }
        Ok(Self { segments, output })
    }

    #[inline]
    #[must_use]
    pub const fn output(&self) -> VectorType {
        self.output
    }

    /// Placeholder indices in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Input(i) => Some(*i),
            Segment::Text(_) => None,
        })
    }

    /// Substitutes input expressions. Each one is parenthesised so operator
    /// precedence in the template is preserved.
    #[must_use]
    pub fn substitute(&self, inputs: &[String]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Input(i) => {
                    out.push('(');
                    out.push_str(&inputs[*i]);
                    out.push(')');
                }
            }
        }
        out
    }
}
