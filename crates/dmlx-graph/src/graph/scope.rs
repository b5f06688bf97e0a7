/// Stack of debug-name segments joined with `_`.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameScope {
    name: String,
    sub_lengths: Vec<usize>,
}

impl NameScope {
    pub(crate) fn push(&mut self, segment: &str) {
        self.sub_lengths.push(self.name.len());
        if segment.is_empty() {
            return;
        }
        if !self.name.is_empty() {
            self.name.push('_');
        }
        self.name.push_str(segment);
    }

    /// Unbalanced pops are ignored.
    pub(crate) fn pop(&mut self) {
        if let Some(length) = self.sub_lengths.pop() {
            self.name.truncate(length);
        }
    }

    pub(crate) fn current(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NameScope;

    #[test]
    fn nested_segments_join_and_unwind() {
        let mut scope = NameScope::default();
        scope.push("encoder");
        scope.push("conv1");
        assert_eq!(scope.current(), Some("encoder_conv1"));
        scope.pop();
        assert_eq!(scope.current(), Some("encoder"));
        scope.pop();
        scope.pop();
        assert_eq!(scope.current(), None);
    }
}
