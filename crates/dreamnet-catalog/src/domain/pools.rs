//! Built-in challenge pools.

use dreamnet_core::role::Role;

use super::challenge::{Challenge, ChallengeId, ChallengePool};

fn entry(
    id: &str,
    role: Role,
    description: &str,
    objective_text: &str,
    content: &str,
    solution_hint: &str,
) -> Challenge {
    Challenge {
        id: ChallengeId::new(id),
        role,
        description: description.to_owned(),
        objective_text: objective_text.to_owned(),
        content: content.to_owned(),
        solution_hint: Some(solution_hint.to_owned()),
    }
}

/// Challenges that call for the Warden's strength and tactics.
#[must_use]
pub fn warden_pool() -> ChallengePool {
    let challenges = vec![
        entry(
            "Warden_BanditAmbush",
            Role::Warden,
            "Territorial bandits block the road and demand a toll.",
            "Deal with the bandits.",
            "Armed with notched blades and cudgels, a band of brigands spreads across the road. \
             Their scarred leader steps forward: \"This road belongs to the Red Claws. Pay the \
             toll, in coin or in blood.\"",
            "The player directs the Warden to intimidate, outmaneuver or fight off the bandits.",
        ),
        entry(
            "Warden_RubbleCollapse",
            Role::Warden,
            "A narrow passage is choked by a rockfall of ancient debris.",
            "Clear the rubble.",
            "Boulders and shattered masonry fill the passage from floor to ceiling. The stones \
             are far too heavy for an ordinary traveler to shift.",
            "The player directs the Warden to use brute strength to clear a path.",
        ),
        entry(
            "Warden_SealedDoor",
            Role::Warden,
            "A sprung trap has slammed an iron door shut across the only way forward.",
            "Force the door open.",
            "A slab of rust-eaten iron seals the corridor. There is no lock and no handle, only \
             a finger-wide gap along the floor.",
            "The player directs the Warden to pry or batter the door open.",
        ),
    ];
    ChallengePool::from_tagged(Role::Warden, challenges)
}

/// Challenges that call for the Scholar's intellect and lore.
#[must_use]
pub fn scholar_pool() -> ChallengePool {
    let challenges = vec![
        entry(
            "Scholar_AncientTome",
            Role::Scholar,
            "A spell-bound tome in a lost language hides a vital clue.",
            "Translate the ancient tome.",
            "A heavy leather tome rests open on a stone lectern. Its glyphs crawl across the page \
             whenever you try to look at them directly.",
            "The player asks the Scholar to read or decipher the tome.",
        ),
        entry(
            "Scholar_RiddleDoor",
            Role::Scholar,
            "A door sealed by a deadly riddle bars the entrance.",
            "Solve the riddle door.",
            "A handleless stone door bears a single glowing line: \"I have cities, but no \
             houses. I have mountains, but no trees. I have water, but no fish. What am I?\"",
            "The player asks the Scholar to answer the riddle. The answer is a map.",
        ),
        entry(
            "Scholar_UnendingLabyrinth",
            Role::Scholar,
            "An illusion folds the corridors into a labyrinth that loops back on itself.",
            "Escape the magical labyrinth.",
            "Every corridor returns you to the same round chamber with a cold brazier at its \
             center. The air shimmers with a faint, dizzying enchantment.",
            "The player asks the Scholar to analyze the magic or break the illusion.",
        ),
    ];
    ChallengePool::from_tagged(Role::Scholar, challenges)
}
