//! Adjudication Prompt Builder.
//!
//! Pure rendering: the same inputs always produce byte-identical output,
//! which is what keeps the reasoning step reproducible under test. No I/O,
//! no clocks, no randomness.

use std::fmt::Write;

use crate::models::{SupportSet, Verdict};

/// Everything the prompt depends on. Category sections render in the
/// fixed `Category::ALL` order regardless of how the map was built.
pub struct PromptInputs<'a> {
    pub case_text: &'a str,
    pub initial_verdict: Verdict,
    pub confidence: f64,
    pub support: &'a SupportSet,
    /// Retrieval query to surface to the judge; `None` omits the section.
    pub query: Option<&'a str>,
    /// Listing cap per category section.
    pub per_category_cap: usize,
    /// Below this the judge may freely revise the verdict.
    pub confidence_threshold: f64,
}

pub fn build_adjudication_prompt(inputs: &PromptInputs) -> String {
    let mut prompt = String::new();

    let _ = write!(
        prompt,
        "You are a judge evaluating a legal dispute under Indian law.\n\n\
         ### Case Facts:\n{}\n\n\
         ### Initial Model Verdict:\n{} (Confidence: {:.2}%)\n\
         This verdict is interpreted as {}.\n",
        inputs.case_text,
        inputs.initial_verdict.as_str().to_uppercase(),
        inputs.confidence * 100.0,
        inputs.initial_verdict.outcome_gloss(),
    );

    if let Some(query) = inputs.query {
        let _ = write!(prompt, "\n### Legal Query Used:\n{query}\n");
    }

    prompt.push_str("\n---\n\n### Legal References Retrieved:\n");
    for (category, chunks) in inputs.support.iter() {
        let _ = write!(
            prompt,
            "\n#### {} (Top {}):\n",
            category.heading(),
            inputs.per_category_cap
        );
        for (i, chunk) in chunks.iter().take(inputs.per_category_cap).enumerate() {
            let _ = writeln!(prompt, "- {}. {}", i + 1, chunk.display_text());
        }
    }

    let threshold_pct = inputs.confidence_threshold * 100.0;
    let _ = write!(
        prompt,
        "\n---\n\n\
         ### Instructions to the Judge (You):\n\n\
         1. Review the legal materials provided:\n\
            - Identify which Constitution articles, IPC sections, statutes, and case laws are relevant to the facts.\n\
            - Also note and explain which retrieved references are **not applicable** or irrelevant.\n\n\
         2. If relevant past cases appear in the retrieved materials, summarize them and analyze whether they support or contradict the model's verdict.\n\n\
         3. Using the above, assess the model's prediction:\n\
            - If confidence is below {threshold_pct:.0}%, you may revise or retain it.\n\
            - If confidence is {threshold_pct:.0}% or higher, retain unless clear legal grounds exist to challenge it.\n\n\
         4. Provide a thorough and formal legal explanation that:\n\
            - Justifies the final decision using legal logic\n\
            - Cites relevant IPCs, constitutional provisions, statutes, and precedents\n\
            - Explains any reasoning for overriding the model's prediction, if applicable\n\n\
         5. Conclude with the following lines, formatted as shown:\n\n\
         Final Verdict: Guilty or Not Guilty\n\
         Verdict Changed: Yes or No\n\n\
         Respond in the tone of a formal Indian judge. Your explanation should reflect reasoning, neutrality, and respect for legal procedure.\n"
    );

    prompt
}
