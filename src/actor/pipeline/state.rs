//! Two-stage pipeline state.
//!
//! ```text
//! compile:   Idle → Compiling → Compiled(artifact) | Failed(CompileError)
//! transform: Idle → Transforming → Transformed(result) | Failed(TransformFailure)
//! ```
//!
//! Every request is stamped with a ticket from its stage's counter. A
//! response is applied only if its ticket is still the latest one issued for
//! that stage, so a slow early response can never overwrite a newer request.

use crate::error::{CompileError, DecodeError, TransformFailure};
use crate::resource::{CompiledArtifact, TransformedResult};

/// Request stamp, unique per stage.
pub type Ticket = u64;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CompileStage {
    #[default]
    Idle,
    Compiling,
    Compiled(CompiledArtifact),
    Failed(CompileError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TransformStage {
    #[default]
    Idle,
    Transforming,
    Transformed(TransformedResult),
    Failed(TransformFailure),
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSnapshot {
    pub compile: CompileStage,
    pub transform: TransformStage,
}

impl PipelineSnapshot {
    pub fn compiled_artifact(&self) -> Option<&CompiledArtifact> {
        match &self.compile {
            CompileStage::Compiled(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn compile_error(&self) -> Option<&CompileError> {
        match &self.compile {
            CompileStage::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn transformed_result(&self) -> Option<&TransformedResult> {
        match &self.transform {
            TransformStage::Transformed(result) => Some(result),
            _ => None,
        }
    }

    pub fn transform_error(&self) -> Option<&TransformFailure> {
        match &self.transform {
            TransformStage::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.compile, CompileStage::Compiling)
            || matches!(self.transform, TransformStage::Transforming)
    }
}

#[derive(Debug, Default)]
pub struct PipelineState {
    compile: CompileStage,
    transform: TransformStage,
    compile_ticket: Ticket,
    transform_ticket: Ticket,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            compile: self.compile.clone(),
            transform: self.transform.clone(),
        }
    }

    pub fn compile_stage(&self) -> &CompileStage {
        &self.compile
    }

    pub fn transform_stage(&self) -> &TransformStage {
        &self.transform
    }

    pub fn artifact(&self) -> Option<&CompiledArtifact> {
        match &self.compile {
            CompileStage::Compiled(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Start a compile, superseding any outstanding compile.
    ///
    /// An outstanding transform belongs to the previous artifact and is
    /// superseded too; a finished transform stays until the compile resolves.
    pub fn begin_compile(&mut self) -> Ticket {
        self.compile_ticket += 1;
        self.compile = CompileStage::Compiling;
        if matches!(self.transform, TransformStage::Transforming) {
            self.reset_transform();
        } else {
            self.transform_ticket += 1;
        }
        self.compile_ticket
    }

    /// Apply a compile response. Returns `false` if the ticket is stale.
    ///
    /// Failure forces the transform stage back to `Idle`.
    pub fn finish_compile(
        &mut self,
        ticket: Ticket,
        result: Result<CompiledArtifact, CompileError>,
    ) -> bool {
        if ticket != self.compile_ticket || !matches!(self.compile, CompileStage::Compiling) {
            return false;
        }
        match result {
            Ok(artifact) => self.compile = CompileStage::Compiled(artifact),
            Err(err) => {
                self.compile = CompileStage::Failed(err);
                self.reset_transform();
            }
        }
        true
    }

    /// Start a transform, superseding any outstanding transform.
    ///
    /// Returns `None` unless the compile stage holds an artifact.
    pub fn begin_transform(&mut self) -> Option<Ticket> {
        self.artifact()?;
        self.transform_ticket += 1;
        self.transform = TransformStage::Transforming;
        Some(self.transform_ticket)
    }

    /// Apply a transform response. Returns `false` if the ticket is stale.
    pub fn finish_transform(
        &mut self,
        ticket: Ticket,
        result: Result<TransformedResult, TransformFailure>,
    ) -> bool {
        if ticket != self.transform_ticket || !matches!(self.transform, TransformStage::Transforming)
        {
            return false;
        }
        self.transform = match result {
            Ok(output) => TransformStage::Transformed(output),
            Err(err) => TransformStage::Failed(err),
        };
        true
    }

    /// Source could not be decoded: fail locally, superseding any outstanding transform.
    pub fn reject_source(&mut self, err: DecodeError) {
        self.transform_ticket += 1;
        self.transform = TransformStage::Failed(TransformFailure::Decode(err));
    }

    /// Back to `Idle`, superseding any outstanding transform.
    pub fn reset_transform(&mut self) {
        self.transform_ticket += 1;
        self.transform = TransformStage::Idle;
    }
}
