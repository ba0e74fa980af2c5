// Company matching: requirement parsing, candidate generation, scoring, short analysis.
// All LLM calls go through llm_client and degrade to the keyword heuristics here.

pub mod analysis;
pub mod catalog;
pub mod handlers;
pub mod keywords;
pub mod matcher;
pub mod prompts;
pub mod requirement_parser;
pub mod scoring;
