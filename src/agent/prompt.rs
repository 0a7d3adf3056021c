//! System prompt template for the spatial agent.

use crate::layers::LayerInfo;
use crate::tools::ToolRegistry;

/// Build the system prompt with tool definitions and the currently loaded layers.
pub fn build_system_prompt(tools: &ToolRegistry, layers: &[LayerInfo]) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let layer_descriptions = if layers.is_empty() {
        "(no layers loaded)".to_string()
    } else {
        layers
            .iter()
            .map(|l| format!("- {}", l))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are a GIS analyst. You answer spatial questions about vector layers by calling tools, one step at a time.

## Loaded Layers

{layer_descriptions}

## Your Tools

{tool_descriptions}

## Rules

1. **Use tools for every spatial fact** - Never guess which features overlap or how many there are. Run the operation and read its result.

2. **Refer to layers by exact name** - Use the names listed above or names returned by earlier tool calls. If a tool reports a missing layer, pick one of the available names it lists.

3. **Chain operations** - Results are stored as new layers. Buffer or intersect first, then summarize the result layer when the question asks for counts or statistics.

4. **Distances are in layer units** - Layers are not reprojected. Mention this if the coordinate system looks geographic (degrees).

5. **Report empty results plainly** - If an intersection is empty, say that no features overlap.

## Response Format

When finished, answer the question directly in a few sentences, naming the result layers you created and the key numbers from their summaries."#,
        layer_descriptions = layer_descriptions,
        tool_descriptions = tool_descriptions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Layer;

    #[test]
    fn prompt_lists_tools_and_layers() {
        let layers = vec![Layer::new("school_zones", Vec::new(), None).info()];
        let prompt = build_system_prompt(&ToolRegistry::new(), &layers);
        assert!(prompt.contains("**buffer_layer**"));
        assert!(prompt.contains("- school_zones: 0 features"));
    }

    #[test]
    fn prompt_notes_missing_layers() {
        let prompt = build_system_prompt(&ToolRegistry::new(), &[]);
        assert!(prompt.contains("(no layers loaded)"));
    }
}
