use crate::types::tool::ToolCall;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Partial {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Collects streamed tool-call fragments into complete [`ToolCall`]s.
///
/// Fragments are keyed by their `index`; the first one for an index carries the
/// id and name, later ones append to the argument text. Arguments are kept as
/// the raw string the model produced, even when it is not valid JSON.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    calls: BTreeMap<u32, Partial>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn on_delta(
        &mut self,
        index: u32,
        id: Option<&str>,
        name: Option<&str>,
        arguments: &str,
    ) {
        let slot = self.calls.entry(index).or_default();
        if let Some(id) = id.filter(|s| !s.is_empty()) {
            slot.id.get_or_insert_with(|| id.to_string());
        }
        if let Some(name) = name.filter(|s| !s.is_empty()) {
            slot.name.get_or_insert_with(|| name.to_string());
        }
        slot.arguments.push_str(arguments);
    }

    /// Name of the call at `index`, once known.
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.calls.get(&index).and_then(|p| p.name.as_deref())
    }

    /// Completed calls ordered by index.
    pub fn finalize(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(|(index, p)| {
                ToolCall::function(
                    p.id.unwrap_or_else(|| format!("call_{index}")),
                    p.name.unwrap_or_default(),
                    p.arguments,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_merge_by_index_and_sort() {
        let mut asm = ToolCallAssembler::new();
        asm.on_delta(1, Some("call_b"), Some("calculate"), "{\"expression\":");
        asm.on_delta(0, Some("call_a"), Some("get_datetime"), "");
        asm.on_delta(1, None, None, "\"2+2\"}");
        asm.on_delta(0, None, None, "{}");
        assert_eq!(asm.name_of(1), Some("calculate"));

        let calls = asm.finalize();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments(), "{}");
        assert_eq!(calls[1].name(), "calculate");
        assert_eq!(calls[1].arguments(), "{\"expression\":\"2+2\"}");
    }

    #[test]
    fn missing_id_gets_placeholder_and_first_id_wins() {
        let mut asm = ToolCallAssembler::new();
        asm.on_delta(2, None, Some("list_directory"), "{}");
        asm.on_delta(2, Some("late"), None, "");
        asm.on_delta(3, None, Some("read_file"), "{not json");
        let calls = asm.finalize();
        assert_eq!(calls[0].id, "late");
        assert_eq!(calls[1].id, "call_3");
        assert_eq!(calls[1].arguments(), "{not json");
    }
}
