use clap::ValueEnum;
use offboard_pipeline::{ExecutionPolicy, ExtractionFallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliExtractionFallback {
    OnFailure,
    WithoutLlm,
    Disabled,
}

impl From<CliExtractionFallback> for ExtractionFallback {
    fn from(value: CliExtractionFallback) -> Self {
        match value {
            CliExtractionFallback::OnFailure => Self::OnFailure,
            CliExtractionFallback::WithoutLlm => Self::WithoutLlm,
            CliExtractionFallback::Disabled => Self::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliExecutionPolicy {
    AllowList,
    Probabilistic,
}

impl CliExecutionPolicy {
    pub fn to_policy(self, success_probability: f64) -> ExecutionPolicy {
        match self {
            Self::AllowList => ExecutionPolicy::AllowList,
            Self::Probabilistic => ExecutionPolicy::Probabilistic {
                success_probability,
            },
        }
    }
}
