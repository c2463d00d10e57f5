//! # Configuration Module / 配置模块
//!
//! The configuration the host hands to the orchestrator: an opaque provider
//! properties map, the fail-fast threshold, opaque CLI-style options for the
//! execution engines, the reports destination, and the per-run test request
//! (suite files, source root, name filter).
//!
//! 宿主交给编排器的配置：不透明的 provider 属性映射、fail-fast 阈值、
//! 传递给执行引擎的不透明 CLI 风格选项、报告输出目录，
//! 以及每次运行的测试请求（套件文件、源根目录、名称过滤器）。

use crate::core::filter::TestFilter;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Provider property key for the rerun-all-tests count.
pub const RERUN_ALL_TESTS_PROPERTY: &str = "rerun_all_tests";

/// Static configuration for one provider instance, loadable from TOML.
/// 单个 provider 实例的静态配置，可从 TOML 加载。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Opaque host-supplied properties. The orchestrator itself reads only
    /// the rerun count; everything else is passed through to the engines.
    /// 宿主提供的不透明属性。编排器本身只读取重跑次数；
    /// 其余全部透传给执行引擎。
    #[serde(default)]
    pub provider_properties: BTreeMap<String, String>,

    /// A positive value enables fail-fast mode: after this many failures,
    /// remaining classes are skipped, and the stop/skip command listeners
    /// are armed when a command channel exists.
    /// 正值启用 fail-fast 模式：失败达到该数量后跳过剩余的类，
    /// 并且在存在命令通道时装配停止/跳过命令监听器。
    #[serde(default)]
    pub skip_after_failure_count: u32,

    /// CLI-style options passed through opaquely to the execution engines.
    #[serde(default)]
    pub cli_options: Vec<String>,

    /// Where engines should write their reports.
    #[serde(default)]
    pub reports_directory: PathBuf,
}

impl ProviderConfig {
    /// The number of *extra* times each class appears when the plan is
    /// enumerated externally. Absent or unparseable means 0. This count never
    /// causes looped execution inside a single invocation; repetition across
    /// runs is driven by the host.
    pub fn rerun_all_tests_count(&self) -> u32 {
        self.provider_properties
            .get(RERUN_ALL_TESTS_PROPERTY)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn is_fail_fast(&self) -> bool {
        self.skip_after_failure_count > 0
    }
}

/// Loads a [`ProviderConfig`] from a TOML file.
///
/// # Arguments
/// * `path` - Path to the configuration file
///
/// # Returns
/// The parsed configuration, or an error if the file cannot be read or parsed
pub fn load_provider_config(path: &Path) -> Result<ProviderConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read provider config: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse provider config: {}", path.display()))?;
    Ok(config)
}

/// What the host asked this run to execute: optional suite-descriptor files,
/// the test source root, and the configured name filter.
/// 宿主要求本次运行执行的内容：可选的套件描述文件、
/// 测试源根目录和配置的名称过滤器。
#[derive(Debug, Clone, Default)]
pub struct TestRequest {
    /// Explicit suite-descriptor files. When present (and no specific filter
    /// is active) they govern the run instead of a classpath scan.
    pub suite_files: Vec<PathBuf>,

    /// Root of the test sources referenced by suite descriptors.
    pub test_source_directory: PathBuf,

    /// The configured include/exclude name filter.
    pub filter: TestFilter,
}

impl TestRequest {
    pub fn new(
        suite_files: Vec<PathBuf>,
        test_source_directory: PathBuf,
        filter: TestFilter,
    ) -> Self {
        Self {
            suite_files,
            test_source_directory,
            filter,
        }
    }
}
