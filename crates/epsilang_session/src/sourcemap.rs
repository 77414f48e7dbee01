use crate::span::Span;

/// A single source file, read fully into memory before tokenization.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    contents: String,
    line_starts: Vec<usize>,
}

impl Source {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let contents = contents.into();

        let mut line_starts = vec![0];
        line_starts.extend(
            contents
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            name: name.into(),
            contents,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn slice(&self, span: Span) -> Option<&str> {
        self.contents.get(span.start..span.end)
    }

    /// 1-based line and column of a byte offset. Offsets past the end
    /// report the position just after the last character.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.contents.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let col = offset - self.line_starts[line - 1];
        (line, col + 1)
    }
}
