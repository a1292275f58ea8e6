pub mod registry_pipeline;
