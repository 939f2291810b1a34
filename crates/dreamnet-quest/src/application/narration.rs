//! Travel narration between quest locations.
//!
//! Three shapes exist: the first departure, the transition after a solved
//! challenge and the walk into the final chamber.

use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::{NarrativeGenerationService, NarrativePurpose, NarrativeRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::phase::{QuestAction, QuestPhase};
use crate::domain::session::QuestSession;

/// Lines the narrator sometimes copies from dialogue prompts.
const STRAY_MARKERS: [&str; 2] = ["SOLUTION=TRUE", "SOLUTION=FALSE"];

/// Which kind of travel is being narrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationShape {
    /// Setting out towards the first challenge.
    Departure,
    /// Moving on from a solved challenge to the next one.
    Transition,
    /// Entering the chamber that holds the artifact.
    FinalChamber,
}

/// Everything the narrator needs to describe one leg of the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationRequest {
    /// Name of the quest.
    pub quest_name: String,
    /// The objective waiting at the destination.
    pub objective: String,
    /// Objective of the challenge just completed, if any.
    #[serde(default)]
    pub previous_challenge: Option<String>,
    /// Whether the destination is the final chamber.
    #[serde(default)]
    pub is_final: bool,
    /// The artifact at the end of the quest.
    pub artifact_name: String,
}

impl NarrationRequest {
    /// The narration shape implied by the request fields.
    #[must_use]
    pub fn shape(&self) -> NarrationShape {
        if self.is_final {
            NarrationShape::FinalChamber
        } else if self.previous_challenge.is_some() {
            NarrationShape::Transition
        } else {
            NarrationShape::Departure
        }
    }

    /// Describes the leg a session is about to travel.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the session is
    /// traveling towards a challenge or the final chamber.
    pub fn for_session(session: &QuestSession) -> Result<Self, DomainError> {
        let rejected = || DomainError::InvalidTransition {
            phase: session.phase().to_string(),
            action: QuestAction::Arrive.describe(),
        };
        let quest = session.quest().ok_or_else(rejected)?;
        let previous_challenge = session.previous_challenge().map(|c| c.objective_text.clone());

        match session.phase() {
            QuestPhase::Traveling(_) => {
                let next = session.upcoming_challenge().ok_or_else(rejected)?;
                Ok(Self {
                    quest_name: quest.quest_name.clone(),
                    objective: next.objective_text.clone(),
                    previous_challenge,
                    is_final: false,
                    artifact_name: quest.artifact_name.clone(),
                })
            }
            QuestPhase::FinalTravel => Ok(Self {
                quest_name: quest.quest_name.clone(),
                objective: format!("Find the {}", quest.artifact_name),
                previous_challenge,
                is_final: true,
                artifact_name: quest.artifact_name.clone(),
            }),
            _ => Err(rejected()),
        }
    }
}

/// Builds the narrator prompt for one leg of the journey.
#[must_use]
pub fn narration_prompt(request: &NarrationRequest) -> String {
    match request.shape() {
        NarrationShape::FinalChamber => format!(
            "You are the game master. The party on the quest \"{quest}\" has overcome every \
             obstacle and now enters the final chamber. Describe in about 60 words how they \
             find the {artifact}, ending with a question inviting the companions to discuss \
             what it is and what it can do.",
            quest = request.quest_name,
            artifact = request.artifact_name,
        ),
        NarrationShape::Transition => format!(
            "You are the game master. The party on the quest \"{quest}\" has just completed: \
             \"{previous}\". Their next objective is: \"{objective}\". Describe the journey \
             to the next location in 50 to 70 atmospheric words.",
            quest = request.quest_name,
            previous = request.previous_challenge.as_deref().unwrap_or_default(),
            objective = request.objective,
        ),
        NarrationShape::Departure => format!(
            "You are the game master. The party sets out on the quest \"{quest}\". Their first \
             objective is: \"{objective}\". Describe the start of the journey in 50 to 70 \
             atmospheric words, ending as they reach the first location.",
            quest = request.quest_name,
            objective = request.objective,
        ),
    }
}

/// Asks the narrator to describe one leg of the journey.
///
/// # Errors
///
/// Propagates narrator failures, and returns
/// `DomainError::MalformedNarrative` if the reply holds no text.
pub async fn narrate(
    request: &NarrationRequest,
    narrator: &dyn NarrativeGenerationService,
) -> Result<String, DomainError> {
    let reply = narrator
        .generate(NarrativeRequest::new(
            NarrativePurpose::TravelNarration,
            narration_prompt(request),
        ))
        .await?;

    let narration = clean_narration(&reply);
    if narration.is_empty() {
        return Err(DomainError::MalformedNarrative(
            "travel narration was empty".to_owned(),
        ));
    }

    debug!(shape = ?request.shape(), quest_name = %request.quest_name, "Travel narrated");
    Ok(narration)
}

fn clean_narration(reply: &str) -> String {
    reply
        .lines()
        .filter(|line| !STRAY_MARKERS.contains(&line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
