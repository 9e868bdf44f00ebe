//! Motive evaluation.
//!
//! After every committed effect batch each unresolved motive's success and
//! failure trees are evaluated in full (no short-circuit) so every atom's
//! truth value is known. That is what lets an atom's one-shot progress
//! message fire at the moment it turns true, even inside an `any` whose
//! other branch already held.
//!
//! Evaluation is a pure computation over `&World`; [`apply_updates`] writes
//! the results back.

use std::collections::BTreeSet;

use parley_types::{ConditionTree, MotiveId, MotiveStatus, PlayerId};
use parley_world::{MotiveState, World, WorldError};

use crate::binding::Bindings;
use crate::predicate::EvalContext;
use crate::vocabulary::Vocabulary;

/// A progress message that should be sent now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Atom id.
    pub atom: String,
    /// Message text.
    pub text: String,
}

/// Result of evaluating one unresolved motive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotiveUpdate {
    /// Owning player.
    pub player: PlayerId,
    /// Motive id.
    pub motive: MotiveId,
    /// New terminal status, if the motive resolved.
    pub resolution: Option<MotiveStatus>,
    /// Atom ids that hold now.
    pub atoms_true: BTreeSet<String>,
    /// Progress messages to emit, in tree order.
    pub progress: Vec<Progress>,
}

/// Evaluates motive condition trees.
#[derive(Debug, Clone, Copy)]
pub struct MotiveEvaluator<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> MotiveEvaluator<'a> {
    /// Evaluator using the given custom predicate kinds.
    pub const fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Evaluate every unresolved motive of every player.
    pub fn evaluate(&self, world: &World) -> Vec<MotiveUpdate> {
        let bindings = Bindings::empty();
        let mut updates = Vec::new();
        for player in world.players() {
            let ctx = EvalContext::new(world, &player.id, &bindings, self.vocabulary);
            for motive in player.motives.iter().filter(|m| !m.status().is_terminal()) {
                updates.push(evaluate_motive(&ctx, motive));
            }
        }
        updates
    }

    /// Record the initial truth of every atom without firing anything.
    ///
    /// Run once at session start so an atom that already holds is not
    /// reported as progress.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if a player or motive vanished mid-update.
    pub fn prime(&self, world: &mut World) -> Result<(), WorldError> {
        let updates = self.evaluate(world);
        for update in updates {
            let motive = motive_state(world, &update)?;
            motive.atoms_true = update.atoms_true;
        }
        Ok(())
    }
}

/// Write evaluation results back to player state.
///
/// Truth values are stored, fired atoms are marked, and resolutions are
/// applied through [`MotiveState::resolve`], which refuses to change a
/// settled motive.
///
/// # Errors
///
/// Returns [`WorldError::UnknownPlayer`] or [`WorldError::UnknownMotive`]
/// if an update names something missing.
pub fn apply_updates(world: &mut World, updates: &[MotiveUpdate]) -> Result<(), WorldError> {
    for update in updates {
        let motive = motive_state(world, update)?;
        motive.atoms_true.clone_from(&update.atoms_true);
        motive.fired.extend(update.progress.iter().map(|p| p.atom.clone()));
        if let Some(status) = update.resolution {
            motive.resolve(status);
        }
    }
    Ok(())
}

fn motive_state<'w>(world: &'w mut World, update: &MotiveUpdate) -> Result<&'w mut MotiveState, WorldError> {
    world
        .player_mut(&update.player)
        .ok_or_else(|| WorldError::UnknownPlayer(update.player.clone()))?
        .motive_mut(update.motive.as_str())
        .ok_or_else(|| WorldError::UnknownMotive {
            player: update.player.clone(),
            motive: update.motive.clone(),
        })
}

fn evaluate_motive(ctx: &EvalContext<'_>, motive: &MotiveState) -> MotiveUpdate {
    let mut atoms = Vec::new();
    let succeeded = eval_tree(ctx, &motive.definition.success, "success", &mut atoms);
    let failed = motive
        .definition
        .failure
        .as_ref()
        .is_some_and(|tree| eval_tree(ctx, tree, "failure", &mut atoms));

    let resolution = if succeeded {
        Some(MotiveStatus::Achieved)
    } else if failed {
        Some(MotiveStatus::Failed)
    } else {
        None
    };

    let mut atoms_true = BTreeSet::new();
    let mut progress = Vec::new();
    for atom in atoms.into_iter().filter(|a| a.holds) {
        let newly_true = !motive.atoms_true.contains(&atom.id);
        if newly_true
            && !motive.fired.contains(&atom.id)
            && let Some(text) = atom.progress
        {
            progress.push(Progress {
                atom: atom.id.clone(),
                text,
            });
        }
        atoms_true.insert(atom.id);
    }

    MotiveUpdate {
        player: ctx.actor.clone(),
        motive: motive.definition.id.clone(),
        resolution,
        atoms_true,
        progress,
    }
}

struct AtomResult {
    id: String,
    holds: bool,
    progress: Option<String>,
}

fn eval_tree(ctx: &EvalContext<'_>, tree: &ConditionTree, path: &str, atoms: &mut Vec<AtomResult>) -> bool {
    match tree {
        ConditionTree::All { of } => {
            let mut all = true;
            for (i, child) in of.iter().enumerate() {
                all &= eval_tree(ctx, child, &format!("{path}.{i}"), atoms);
            }
            all
        }
        ConditionTree::Any { of } => {
            let mut any = false;
            for (i, child) in of.iter().enumerate() {
                any |= eval_tree(ctx, child, &format!("{path}.{i}"), atoms);
            }
            any
        }
        ConditionTree::Not { condition } => !eval_tree(ctx, condition, &format!("{path}.not"), atoms),
        ConditionTree::Atom(atom) => {
            let holds = ctx.evaluate(&atom.check).is_ok();
            atoms.push(AtomResult {
                id: atom.id.clone().unwrap_or_else(|| path.to_owned()),
                holds,
                progress: atom.progress.clone(),
            });
            holds
        }
    }
}
