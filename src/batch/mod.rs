//! Batch runner
//!
//! The core of the studio: given the active mode, the slot contents, and
//! the instruction text, build a work plan of remote calls and drive them
//! strictly sequentially, in input order, with one outstanding call at a
//! time. Progress is reported through a callback before each unit so the
//! UI can render a live label.
//!
//! Failure is fail-fast with no partial results: the first rejected call
//! aborts the run, remaining units are never issued, and the caller is
//! informed once.

use thiserror::Error;

use crate::api::{ApiError, RemoteImageOp};
use crate::state::data::{ImageRef, ResultRecord};
use crate::state::mode::Mode;

/// Output name used by prompt-only generation
pub const GENERATED_IMAGE_NAME: &str = "generated_image.png";

/// Why a batch run could not produce results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The work plan was empty; the submit gating should prevent this.
    #[error("nothing to generate for the current selection")]
    EmptySelection,
    /// A remote call was rejected. Aborts the whole run.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The remote call one work unit performs.
#[derive(Debug, Clone)]
pub enum RemoteCall {
    /// `compose(a, b, instruction)` — both paired modes
    Compose { a: ImageRef, b: ImageRef },
    /// `edit(image, instruction)`
    Edit { image: ImageRef },
    /// `generate(instruction)`
    Generate,
    /// `place_on_wall(image, instruction)`
    PlaceOnWall { image: ImageRef },
}

/// One unit of work: a remote call plus its derived output name and the
/// progress label shown while it runs.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub call: RemoteCall,
    pub output_name: String,
    pub progress_label: String,
}

/// An ordered plan of work units for one batch run.
#[derive(Debug, Clone)]
pub struct WorkPlan {
    pub units: Vec<WorkUnit>,
    pub instruction: String,
}

impl WorkPlan {
    /// Build the plan for the active mode.
    ///
    /// `primary` and `secondary` are the contents of the mode's slots, in
    /// selection order. Preconditions (both sides present for paired modes,
    /// a non-empty instruction where required) are validated by the caller
    /// before this point; an impossible combination yields
    /// `RunError::EmptySelection` rather than a partial plan.
    pub fn build(
        mode: Mode,
        primary: &[ImageRef],
        secondary: &[ImageRef],
        instruction: &str,
    ) -> Result<WorkPlan, RunError> {
        let units = match mode {
            Mode::TryOnOutfits => {
                let model = primary.first().ok_or(RunError::EmptySelection)?;
                if secondary.is_empty() {
                    return Err(RunError::EmptySelection);
                }
                let total = secondary.len();
                secondary
                    .iter()
                    .enumerate()
                    .map(|(index, outfit)| WorkUnit {
                        call: RemoteCall::Compose {
                            a: model.clone(),
                            b: outfit.clone(),
                        },
                        output_name: paired_name(&model.name, &outfit.name),
                        progress_label: generating_label(index, total),
                    })
                    .collect()
            }
            Mode::TryOnModels => {
                let outfit = secondary.first().ok_or(RunError::EmptySelection)?;
                if primary.is_empty() {
                    return Err(RunError::EmptySelection);
                }
                let total = primary.len();
                primary
                    .iter()
                    .enumerate()
                    .map(|(index, model)| WorkUnit {
                        call: RemoteCall::Compose {
                            a: model.clone(),
                            b: outfit.clone(),
                        },
                        output_name: paired_name(&model.name, &outfit.name),
                        progress_label: generating_label(index, total),
                    })
                    .collect()
            }
            Mode::EditImage => {
                let image = primary.first().ok_or(RunError::EmptySelection)?;
                vec![WorkUnit {
                    call: RemoteCall::Edit {
                        image: image.clone(),
                    },
                    output_name: format!("edited_{}", image.name),
                    progress_label: "Editing image...".to_string(),
                }]
            }
            Mode::GenerateImage => vec![WorkUnit {
                call: RemoteCall::Generate,
                output_name: GENERATED_IMAGE_NAME.to_string(),
                progress_label: "Generating image...".to_string(),
            }],
            Mode::PosterPlacement => {
                if primary.is_empty() {
                    return Err(RunError::EmptySelection);
                }
                let total = primary.len();
                primary
                    .iter()
                    .enumerate()
                    .map(|(index, poster)| WorkUnit {
                        call: RemoteCall::PlaceOnWall {
                            image: poster.clone(),
                        },
                        output_name: format!("poster_in_room_{}", poster.name),
                        progress_label: placing_label(index, total),
                    })
                    .collect()
            }
        };

        Ok(WorkPlan {
            units,
            instruction: instruction.to_string(),
        })
    }

    /// Number of remote calls this plan will issue.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Drive a work plan to completion.
///
/// Units run strictly sequentially in plan order; the runner suspends on
/// each call before issuing the next, so result index i always corresponds
/// to unit i. `progress` is invoked with the unit's label before its call
/// goes out.
///
/// On the first failure the run aborts: collected results are discarded
/// and the remaining units are never issued.
pub async fn run<C, F>(
    client: &C,
    plan: &WorkPlan,
    mut progress: F,
) -> Result<Vec<ResultRecord>, RunError>
where
    C: RemoteImageOp + ?Sized,
    F: FnMut(&str),
{
    if plan.is_empty() {
        return Err(RunError::EmptySelection);
    }

    let mut results = Vec::with_capacity(plan.len());

    for unit in &plan.units {
        progress(&unit.progress_label);

        let bytes = match &unit.call {
            RemoteCall::Compose { a, b } => client.compose(a, b, &plan.instruction).await?,
            RemoteCall::Edit { image } => client.edit(image, &plan.instruction).await?,
            RemoteCall::Generate => client.generate(&plan.instruction).await?,
            RemoteCall::PlaceOnWall { image } => {
                client.place_on_wall(image, &plan.instruction).await?
            }
        };

        results.push(ResultRecord::new(unit.output_name.clone(), bytes));
    }

    tracing::info!(results = results.len(), "batch run complete");

    Ok(results)
}

/// A name's stem: everything before the first `.`.
///
/// `"red_dress.front.png"` stems to `"red_dress"`. Distinct inputs can in
/// principle stem to the same value; no disambiguation is attempted.
fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// `{model_stem}_{outfit_stem}.png` for both paired modes.
fn paired_name(model_name: &str, outfit_name: &str) -> String {
    format!("{}_{}.png", stem(model_name), stem(outfit_name))
}

fn generating_label(index: usize, total: usize) -> String {
    format!("Generating {} images... ({} of {})", total, index + 1, total)
}

fn placing_label(index: usize, total: usize) -> String {
    format!("Placing {} posters... ({} of {})", total, index + 1, total)
}
