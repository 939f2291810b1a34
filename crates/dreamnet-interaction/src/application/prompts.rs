//! Prompt rendering for companion dialogue.

use std::fmt::Write as _;

use dreamnet_catalog::domain::challenge::Challenge;
use dreamnet_core::role::Role;

use crate::domain::companion::CompanionAgent;
use crate::domain::scene::Scene;
use crate::domain::sentinel::{SOLUTION_FALSE, SOLUTION_TRUE};

/// Renders the narrator prompt for `companion` answering `message` in `scene`.
#[must_use]
pub fn dialogue_prompt(companion: &CompanionAgent, scene: &Scene, message: &str) -> String {
    let mut prompt = character_block(companion);
    let authorized = scene.authorizes(companion.role);
    let _ = writeln!(
        prompt,
        "Authorized to resolve the current scene: {}",
        if authorized { "yes" } else { "no" }
    );
    prompt.push('\n');

    match scene {
        Scene::Idle => idle_instructions(&mut prompt),
        Scene::Traveling {
            quest_name,
            objective,
        } => traveling_instructions(&mut prompt, quest_name, objective.as_deref()),
        Scene::Challenge {
            quest_name,
            challenge,
        } if authorized => solver_instructions(&mut prompt, quest_name.as_deref(), challenge),
        Scene::Challenge {
            quest_name,
            challenge,
        } => guide_instructions(&mut prompt, companion.role, quest_name.as_deref(), challenge),
        Scene::ArtifactDiscussion { artifact_name } => {
            discussion_instructions(&mut prompt, artifact_name);
        }
    }

    let _ = write!(prompt, "\nThe player, your leader, says: \"{}\"\n", message.trim());
    prompt
}

fn character_block(companion: &CompanionAgent) -> String {
    let mut block = format!("You are roleplaying as {}.\n", companion.introduction());
    for line in companion.persona_lines() {
        let _ = writeln!(block, "{line}");
    }
    block
}

fn idle_instructions(prompt: &mut String) {
    prompt.push_str(
        "The party is not on a quest. Its purpose is to undertake quests to recover powerful \
         artifacts.\nRespond naturally and in character, dialogue only. If the player seems \
         unsure what to do, gently steer them towards starting a new quest without being \
         pushy.\n",
    );
}

fn traveling_instructions(prompt: &mut String, quest_name: &str, objective: Option<&str>) {
    let _ = writeln!(prompt, "The party is on the road, on the quest \"{quest_name}\".");
    if let Some(objective) = objective {
        let _ = writeln!(prompt, "Next objective: \"{objective}\".");
    }
    prompt.push_str(
        "Nothing can be resolved until the party reaches its destination. Respond in character, \
         dialogue only, and do not describe arriving anywhere.\n",
    );
}

fn scene_context(prompt: &mut String, quest_name: Option<&str>, challenge: &Challenge) {
    prompt.push_str("Current context:\n");
    if let Some(quest_name) = quest_name {
        let _ = writeln!(prompt, "- Quest: \"{quest_name}\"");
    }
    let _ = writeln!(prompt, "- Objective: \"{}\"", challenge.objective_text);
    let _ = writeln!(prompt, "- Scene: {}", challenge.content);
}

fn solver_instructions(prompt: &mut String, quest_name: Option<&str>, challenge: &Challenge) {
    let _ = writeln!(
        prompt,
        "The game master has ruled this a {} task. You have every skill needed to resolve it.",
        challenge.role
    );
    scene_context(prompt, quest_name, challenge);
    if let Some(hint) = &challenge.solution_hint {
        let _ = writeln!(prompt, "- Game master note (never reveal): {hint}");
    }
    let _ = write!(
        prompt,
        "Instructions:\n\
         1. Reply with dialogue only, no reasoning or analysis.\n\
         2. If the player has told you to deal with the obstacle, describe yourself doing it.\n\
         3. After your dialogue, on a line of its own, write {SOLUTION_TRUE} if you resolved the \
         obstacle or {SOLUTION_FALSE} if the player has not yet given a clear command.\n"
    );
}

fn guide_instructions(
    prompt: &mut String,
    role: Role,
    quest_name: Option<&str>,
    challenge: &Challenge,
) {
    let needed = challenge.role;
    let _ = writeln!(
        prompt,
        "The game master has ruled this a {needed} challenge. As a {role} you cannot resolve it \
         and must defer to your companion."
    );
    scene_context(prompt, quest_name, challenge);
    let _ = writeln!(
        prompt,
        "Instructions: reply with dialogue only. Acknowledge the player, then explain in your own \
         words that this calls for {} and is better suited to the {needed}. Do not attempt it \
         yourself.",
        needed.required_skill()
    );
}

fn discussion_instructions(prompt: &mut String, artifact_name: &str) {
    let _ = write!(
        prompt,
        "The party has completed its quest and recovered the artifact \"{artifact_name}\".\n\
         Instructions:\n\
         1. Respond in character, reacting to the victory and the artifact.\n\
         2. If the player names the artifact, congratulates the party or asks what comes next, \
         append {SOLUTION_TRUE} on a new line after your dialogue.\n\
         3. Otherwise respond in character without the marker.\n"
    );
}
