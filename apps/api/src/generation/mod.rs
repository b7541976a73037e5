// Description generation: prompt store and generator.
// All completion calls go through llm_client.

pub mod generator;
pub mod prompts;
