//! Quest composition: draw two challenges, then ask the narrative service
//! to name and frame them.
//!
//! The service reply must yield every field of a [`Quest`]. Anything less
//! is `MalformedNarrative` and no quest is returned.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Mutex;

use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::{NarrativeGenerationService, NarrativePurpose, NarrativeRequest};
use dreamnet_core::rng::DeterministicRng;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::catalog::{ChallengeDraw, QuestCatalog};
use crate::domain::challenge::{Challenge, ChallengeId};
use crate::domain::quest::{Quest, QuestOrder};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestBlueprint {
    quest_name: String,
    quest_hook: String,
    dm_notes: String,
    artifact_name: String,
    #[serde(alias = "questOrder")]
    objectives: Vec<ObjectiveBlueprint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectiveBlueprint {
    id: String,
    objective_text: String,
}

/// Renders the composition prompt for a drawn pair.
#[must_use]
pub fn composition_prompt(draw: &ChallengeDraw) -> String {
    let mut prompt = String::from(
        "You are the game master of a text adventure. Frame a new quest around the two \
         challenges below, which the party will face in the order listed.\n\n",
    );
    for (position, challenge) in draw.in_order().iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. [{}] {} challenge: {}",
            position + 1,
            challenge.id,
            challenge.role,
            challenge.description
        );
    }
    prompt.push_str(
        "\nInvent a quest name and a magical artifact waiting at the end. Write a quest hook \
         of 100 to 150 words for the player: lore and the goal only, without revealing the \
         challenges. Write short private game-master notes that do mention both challenges. \
         For each challenge, write a one-sentence player objective.\n\
         Reply with a single JSON object and nothing else:\n\
         {\"questName\": \"...\", \"questHook\": \"...\", \"dmNotes\": \"...\", \
         \"artifactName\": \"...\", \"objectives\": [{\"id\": \"...\", \"objectiveText\": \"...\"}]}\n",
    );
    prompt
}

/// Turns a narrative reply into a quest for the drawn pair.
///
/// The reply may wrap the JSON object in prose or code fences; everything
/// from the first `{` to the last `}` is parsed.
///
/// # Errors
///
/// Returns `DomainError::MalformedNarrative` if no JSON object is found, a
/// field is missing or blank, or the objectives do not name exactly the two
/// drawn challenges.
pub fn parse_composition(reply: &str, draw: &ChallengeDraw) -> Result<Quest, DomainError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| DomainError::MalformedNarrative("no JSON object in reply".to_owned()))?;
    let blueprint: QuestBlueprint = serde_json::from_str(json)
        .map_err(|e| DomainError::MalformedNarrative(format!("quest reply: {e}")))?;

    let quest_name = required("questName", &blueprint.quest_name)?;
    let quest_hook = required("questHook", &blueprint.quest_hook)?;
    let dm_notes = required("dmNotes", &blueprint.dm_notes)?;
    let artifact_name = required("artifactName", &blueprint.artifact_name)?;

    if blueprint.objectives.len() != QuestOrder::LEN {
        return Err(DomainError::MalformedNarrative(format!(
            "expected {} objectives, got {}",
            QuestOrder::LEN,
            blueprint.objectives.len()
        )));
    }

    let first = with_objective(&draw.first, &blueprint.objectives)?;
    let second = with_objective(&draw.second, &blueprint.objectives)?;
    let quest_order = QuestOrder::new(first, second)
        .map_err(|e| DomainError::MalformedNarrative(e.to_string()))?;

    Ok(Quest {
        quest_name,
        artifact_name,
        quest_hook,
        dm_notes,
        quest_order,
    })
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MalformedNarrative(format!("{field} is blank")));
    }
    Ok(trimmed.to_owned())
}

fn with_objective(
    challenge: &Challenge,
    objectives: &[ObjectiveBlueprint],
) -> Result<Challenge, DomainError> {
    let objective = objectives
        .iter()
        .find(|o| o.id.trim() == challenge.id.as_str())
        .ok_or_else(|| {
            DomainError::MalformedNarrative(format!("no objective for challenge {}", challenge.id))
        })?;
    let text = required("objectiveText", &objective.objective_text)?;
    Ok(challenge.with_objective(text))
}

/// Asks the narrative service to frame an already drawn pair.
///
/// # Errors
///
/// Propagates service failures and returns `DomainError::MalformedNarrative`
/// for unusable replies.
pub async fn compose_quest(
    draw: &ChallengeDraw,
    narrator: &dyn NarrativeGenerationService,
) -> Result<Quest, DomainError> {
    let request = NarrativeRequest::new(NarrativePurpose::QuestComposition, composition_prompt(draw));
    let reply = narrator.generate(request).await?;
    debug!(reply_len = reply.len(), "received quest composition reply");
    parse_composition(&reply, draw)
}

/// Assembles a new quest from the catalog, skipping `excluded` challenges.
///
/// The `Mutex` is locked only for the synchronous draw, never across an
/// await.
///
/// # Errors
///
/// Returns `DomainError::PoolExhausted` if a role has no unused challenge,
/// `DomainError::MalformedNarrative` for an unusable reply, and propagates
/// service failures.
pub async fn select_quest(
    catalog: &QuestCatalog,
    excluded: &BTreeSet<ChallengeId>,
    rng: &Mutex<dyn DeterministicRng + Send>,
    narrator: &dyn NarrativeGenerationService,
) -> Result<Quest, DomainError> {
    let draw = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Validation(format!("RNG mutex poisoned: {e}")))?;
        catalog.draw(excluded, &mut *rng_guard)?
    };

    info!(
        first = %draw.first.id,
        second = %draw.second.id,
        excluded = excluded.len(),
        "drew quest challenges"
    );

    let quest = compose_quest(&draw, narrator).await?;
    info!(quest_name = %quest.quest_name, artifact = %quest.artifact_name, "quest composed");
    Ok(quest)
}
