// Prompt rendering for the generation step.
use crate::context::ContextBundle;

/// Render the annotated candidates as the retrieval context block.
pub fn render_context(bundle: &ContextBundle) -> String {
    if bundle.matches.is_empty() {
        return "No matching recipes found.".to_string();
    }

    let mut blocks = Vec::new();

    for (i, candidate) in bundle.matches.iter().enumerate() {
        let record = &candidate.record;
        let mut block = format!(
            "Recipe {}: {}\nCategory: {}\nRelevance score: {:.2}\n\nINGREDIENTS:\n{}\n\nMETHOD:\n{}\n",
            i + 1,
            record.header,
            record.category_label(),
            candidate.score,
            record.ingredients,
            record.method,
        );

        if let Some(tip) = record.tip.as_deref() {
            if !tip.is_empty() {
                block.push_str(&format!("\nCHEF'S TIP: {tip}\n"));
            }
        }

        if !candidate.found.is_empty() {
            block.push_str(&format!(
                "\nIngredients you already have: {}\n",
                candidate.found.join(", ")
            ));
        }
        if !candidate.missing.is_empty() {
            block.push_str(&format!(
                "Ingredients still needed: {}\n",
                candidate.missing.join(", ")
            ));
        }

        block.push_str(&format!("\n{}\n", "=".repeat(80)));
        blocks.push(block);
    }

    blocks.join("\n")
}

/// Build the full generation prompt from an assembled context bundle.
pub fn build_prompt(bundle: &ContextBundle) -> String {
    let mut prompt = format!(
        "You are a helpful cooking assistant with access to a recipe database.\n\n\
USER'S AVAILABLE INGREDIENTS:\n{}\n\n\
RELEVANT RECIPES FROM DATABASE:\n{}\n\n\
Based on the user's available ingredients and the retrieved recipes above, \
provide helpful recipe recommendations.\n\n\
For each recommended recipe:\n\
1. Explain why it's a good match for their ingredients\n\
2. List which ingredients they already have\n\
3. List any missing ingredients (if any)\n\
4. Provide cooking tips or substitution suggestions if relevant\n\n\
Be conversational and friendly. If none of the recipes are a perfect match, \
suggest the closest options and explain what additional ingredients they \
would need.\n",
        bundle.request.ingredients.join(", "),
        render_context(bundle),
    );

    if let Some(constraint) = bundle.request.constraint.as_deref() {
        prompt.push_str(&format!("\nADDITIONAL USER REQUEST:\n{constraint}\n"));
    }

    prompt
}
