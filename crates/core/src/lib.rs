mod apply;
mod checks;
mod config;
mod entry;
mod generator;
mod store;
mod template;
mod token;

pub const DEFAULT_TEMPLATE: &str = "{num:4:1:1}_{orig}";

pub use apply::{apply_plan, ApplyOutcome, ApplyReport};
pub use checks::{check_file_name, NameViolation};
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use entry::{FileEntry, ImportError, SUPPORTED_EXTENSIONS};
pub use generator::{
    generate, generate_with_options, Conflict, ConflictKind, GenerateError, GenerateOptions,
    RenamePair, RenamePlan, RenameStats,
};
pub use store::{
    find_template, load_templates, load_templates_from, remove_template, save_templates,
    save_templates_to, templates_from_json, templates_to_json, upsert_template, SavedTemplate,
};
pub use template::{
    format_template, parse_template, validate_template, ParseError, Template, TemplateError,
};
pub use token::{render, DateReference, ParameterError, Token};
