pub mod languages;
pub mod pipeline;
pub mod preferences;
pub mod settings_store;
pub mod similarity;
pub mod suggestions;
pub mod translator;
pub mod translator_types;
pub mod vocabulary;
