//! Prompts sent to the AI backend.
//!
//! Both prompts are fixed. The solution prompt embeds the paper text between
//! triple-quote delimiters so question numbering inside the paper cannot be
//! mistaken for instructions.

/// Instruction block prepended to every question paper.
pub const SOLUTION_INSTRUCTIONS: &str = r#"You are an expert tutor. A student has shared the question paper below and needs complete, step-by-step solutions.

For EVERY question in the paper:

1. IDENTIFY THE QUESTION
   - Start with the question number exactly as it appears in the paper
   - Restate the question briefly in your own words

2. METHOD
   - Solve the question step by step, numbering each step
   - Show all working: formulas used, substitutions, intermediate results
   - Explain why each step follows from the previous one

3. FINAL ANSWER
   - State the final answer clearly on its own line, prefixed with "Answer:"
   - Include units where they apply

4. KEY CONCEPTS
   - List the key concepts, theorems or rules the question tests
   - Give a one-sentence explanation of each

FORMAT
   - Use headings for each question and numbered lists for steps
   - Keep explanations clear enough for a student revising alone
   - If part of a question is illegible or ambiguous, say so and solve the most likely reading
   - Do NOT skip questions"#;

/// Prompt used by the readiness probe. Any non-empty reply counts as ready.
pub const READINESS_PROMPT: &str = "Respond with the single word: OK";

/// Build the full solution prompt for a question paper.
pub fn solution_prompt(paper: &str) -> String {
    format!(
        "{}\n\nQUESTION PAPER:\n\"\"\"\n{}\n\"\"\"",
        SOLUTION_INSTRUCTIONS, paper
    )
}
