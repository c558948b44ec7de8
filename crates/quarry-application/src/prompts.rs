//! Prompt text for every completion-backed stage.
//!
//! Output shape (numbered sections, comma lists, the 7-part template) is
//! requested here in natural language only; nothing downstream assumes the
//! model complied.

pub const PLANNER_SYSTEM: &str = "You are an expert research planner.";

pub const EXTRACTOR_SYSTEM: &str =
    "You turn research plans into concise web search queries. You reply with the queries only.";

pub const SECTION_WRITER_SYSTEM: &str =
    "You are a professional research writer. Use ONLY the provided search results.";

pub const REPORT_WRITER_SYSTEM: &str = "You are a senior research analyst. \
    Write structured, factual reports grounded only in the research notes you are given.";

pub const REFINER_SYSTEM: &str = "You revise research reports according to user instructions. \
    You always return the complete revised report.";

/// Sections every full report must contain, in order.
pub const REPORT_SECTIONS: [&str; 7] = [
    "Executive Summary",
    "Background",
    "Key Findings",
    "Data Insights",
    "Challenges",
    "Future Outlook",
    "Conclusion",
];

pub fn sectioned_plan_prompt(topic: &str) -> String {
    format!(
        "Create a structured research plan with 5 main sections\n\
         for the topic: {topic}.\n\n\
         Only return section titles in numbered format."
    )
}

pub fn agents_plan_prompt(topic: &str, max_queries: usize) -> String {
    format!(
        "Create a research plan for the topic: {topic}.\n\n\
         Return exactly three labeled blocks:\n\
         Outline:\n5 numbered section titles.\n\n\
         Search Queries:\nUp to {max_queries} concise web search queries, one per line.\n\n\
         Structure:\nOne sentence per section describing what it should cover."
    )
}

pub fn extractor_prompt(plan: &str, max_queries: usize) -> String {
    format!(
        "From the research plan below, produce at most {max_queries} web search queries.\n\
         Return ONLY the queries as one comma-separated list, without numbering, \
         quotes or commentary.\n\n\
         Research plan:\n{plan}"
    )
}

pub fn section_prompt(topic: &str, section: &str, search_results: &str) -> String {
    format!(
        "Topic: {topic}\n\
         Section: {section}\n\n\
         Search Results:\n{search_results}\n\n\
         Write a detailed, factual section based only on the search results."
    )
}

pub fn report_prompt(topic: &str, research_notes: &str) -> String {
    let sections = REPORT_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, name)| format!("## {}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Topic: {topic}\n\n\
         Research notes (grouped by search query):\n{research_notes}\n\n\
         Write a structured research report using exactly these section headers:\n\
         {sections}\n\n\
         Rules:\n\
         - Base every claim on the research notes.\n\
         - Cite inline as (Source: Title) using the result titles from the notes.\n\
         - Where notes say no results were found, state that information is limited.\n\
         - Where notes say search was unavailable, say the data could not be retrieved; \
         do not present that as an absence of information."
    )
}

pub fn refine_prompt(report: &str, instruction: &str) -> String {
    format!(
        "Current report:\n{report}\n\n\
         Instruction: {instruction}\n\n\
         Apply the instruction and return the full updated report. \
         Keep content unrelated to the instruction unchanged."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prompt_lists_all_sections() {
        let prompt = report_prompt("renewable energy", "### q\nnotes");
        for name in REPORT_SECTIONS {
            assert!(prompt.contains(name), "missing {name}");
        }
        assert!(prompt.contains("(Source: Title)"));
        assert!(prompt.contains("### q\nnotes"));
    }

    #[test]
    fn test_sectioned_plan_prompt_names_topic() {
        let prompt = sectioned_plan_prompt("quantum sensing");
        assert!(prompt.contains("for the topic: quantum sensing."));
        assert!(prompt.contains("numbered format"));
    }
}
