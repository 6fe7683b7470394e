pub const APP_NAME: &str = "prophet-build";

/// Project configuration file, looked up at the project root.
pub const CONFIG_FILENAME: &str = "prophet-build.toml";

pub const DEFAULT_MODELS_DIR: &str = "stan";
pub const DEFAULT_ARTIFACTS_SUBDIR: &str = "stan_models";
pub const DEFAULT_BUILD_LIB: &str = "build/lib";
pub const DEFAULT_COMPILER: &str = "stanc";
pub const DEFAULT_PATH_VAR: &str = "PYTHONPATH";

pub const SOURCE_EXTENSION: &str = "stan";
pub const ARTIFACT_EXTENSION: &str = "json";

/// Version of the artifact envelope written by the builder.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Suffix of package metadata directories discovered on the search path.
pub const PKG_INFO_SUFFIX: &str = ".pkg-info";
pub const PKG_INFO_FILENAME: &str = "metadata.json";
pub const DEV_LINK_SUFFIX: &str = ".dev-link";

pub const BUILD_LIB_ENV: &str = "PROPHET_BUILD_LIB";
pub const COMPILER_ENV: &str = "PROPHET_BUILD_COMPILER";
pub const PACKAGE_DIR_ENV: &str = "PROPHET_BUILD_PACKAGE_DIR";
