//! Prompt text for the generation service
//!
//! Every request the gateway sends is built here so the wording lives in one
//! place and can be tested without a network.

use crate::domain::{AspectRatio, Character, CharacterOutline, Concept};

/// Prompt asking for the main cast of a song's music video
pub fn initial_characters_prompt(song_title: &str, lyrics: &str, count: usize) -> String {
    format!(
        "Based on the song '{song_title}' with lyrics:\n\n{lyrics}\n\n\
         Describe {count} distinct and compelling main characters for a music video. \
         For each character, provide a unique name and a brief backstory/description \
         relevant to the song's themes."
    )
}

/// Prompt asking for a single character name; answered on one line
pub fn character_name_prompt(description: &str) -> String {
    format!(
        "Based on the following character description, suggest a single, cool, and \
         fitting name. Description: \"{description}\". Respond with only the name."
    )
}

/// Instruction accompanying the reference images of a character sheet request
pub fn character_sheet_prompt(character: &CharacterOutline) -> String {
    format!(
        "Based on the reference images, create a character sheet for '{}', described as: \
         \"{}\". Generate three cinematic, photorealistic images with consistent appearance: \
         1. Full-body shot. 2. Medium shot from the waist up. 3. Close-up portrait. \
         Maintain the same character, clothing, and style.",
        character.name, character.description
    )
}

/// Prompt asking for the video concept; the first character leads
pub fn concept_prompt(song_title: &str, lyrics: &str, characters: &[Character]) -> String {
    let cast = match characters.split_first() {
        Some((lead, rest)) => {
            let mut cast = format!(
                "featuring the main character '{}' ({})",
                lead.name, lead.description
            );
            if !rest.is_empty() {
                let names: Vec<String> = rest.iter().map(|c| format!("'{}'", c.name)).collect();
                cast.push_str(&format!(" and supporting character(s): {}", names.join(", ")));
            }
            cast
        }
        None => String::new(),
    };

    format!(
        "For a music video for the song '{song_title}' {cast}, create a brief music video \
         concept. The lyrics are:\n\n{lyrics}\n\nBased on the characters' collective \
         appearance, describe the overall aesthetic (e.g. 'gritty urban noir', 'surreal \
         dreamscape'). Also provide a short story arc, and explain how the story connects \
         to the song's lyrics."
    )
}

/// Prompt asking for `count` chronological scene descriptions
pub fn scene_prompts_prompt(
    song_title: &str,
    characters: &[Character],
    concept: &Concept,
    count: usize,
) -> String {
    let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
    let lead = names.first().copied().unwrap_or("the main character");

    format!(
        "Based on the song '{song_title}', the characters ({}), and the concept '{} - {}', \
         generate exactly {count} distinct, chronological scene prompts for a music video. \
         Each prompt should be a concise, visually descriptive sentence suitable for an \
         image generation model. Ensure '{lead}' is the primary subject, but include other \
         characters where the story requires. Refer to characters by their exact names.",
        names.join(", "),
        concept.aesthetic,
        concept.story
    )
}

/// Instruction accompanying the character-sheet images of a scene request
pub fn scene_image_prompt(
    prompt: &str,
    concept: &Concept,
    characters: &[Character],
    aspect_ratio: AspectRatio,
) -> String {
    let references: Vec<String> = characters
        .iter()
        .map(|c| {
            format!(
                "For the character '{}', strictly adhere to their appearance in the provided reference images.",
                c.name
            )
        })
        .collect();

    format!(
        "CRITICAL INSTRUCTION: Generate a single image with an EXACT aspect ratio of {ratio}. \
         The final image dimensions MUST strictly follow {description}. Do not crop the image \
         or add black bars.\n\n\
         CHARACTER REFERENCE: {references}\n\n\
         SCENE: \"{prompt}\"\n\n\
         STYLE: Cinematic music video still, {aesthetic}, high detail, professional color grading.",
        ratio = aspect_ratio.as_str(),
        description = aspect_ratio.description(),
        references = references.join(" "),
        aesthetic = concept.aesthetic,
    )
}
