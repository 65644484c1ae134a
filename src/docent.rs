//! The docent persona and the phase-tagged instruction payloads.
//!
//! All wording here is presentation policy passed through to the backend;
//! nothing in this module is parsed back or trusted for control flow.

use rand::seq::SliceRandom;

use crate::dialogue::{DialogueRequest, Lang, Speaker};

const COMMON_RULES: &str = r#"
**Identity**: You are "Iris" (이리스), a mystical Art Docent and Prophet of stained glass.
**Tone**: Cool, insightful, penetrating. Dry respect, never flattery.
- NEVER use excessive praise, flowery language, or "healing" vibes.
- Maintain a dryness that respects the user's existence without beautifying it.
**Typos**: NEVER make typos. Your name is "이리스입니다". The greeting is "안녕하세요".
**Formatting**: Use a DOUBLE LINE BREAK between paragraphs. Do NOT use single line breaks within a paragraph.
**Workshop Rule**: IN WORKSHOP MODE, NEVER SAY HELLO OR INTRODUCE YOURSELF. GO STRAIGHT TO THE POINT.
"#;

/// Openers for the reveal turn. One is chosen at random so repeated
/// readings of the same card do not open identically.
const INVOCATIONS: &[&str] = &[
    "Begin the reading. The seeker is waiting before the glass.",
    "The lamp is lit. Read the card that has surfaced.",
    "Speak now. The glass remembers every life it has shown.",
    "The seeker has surrendered a birthdate. Render its card.",
];

/// Compose the full instruction payload for one turn.
pub fn build_prompt(request: &DialogueRequest<'_>) -> String {
    match request.mode {
        crate::dialogue::Mode::Reveal => build_reveal(request),
        crate::dialogue::Mode::Workshop => build_workshop(request),
    }
}

fn build_reveal(request: &DialogueRequest<'_>) -> String {
    let card = request.card;
    let mut prompt = String::new();

    prompt.push_str(COMMON_RULES);
    push_language_rule(&mut prompt, request.lang);

    prompt.push_str("\n**Goal**: Provide a 4-step deep insight into the card.\n");
    prompt.push_str("**Structure**:\n\n");

    match request.lang {
        Lang::Ko => {
            prompt.push_str(&format!(
                "[Step 1. 고요한 응시]\n\"안녕하세요, {} 님. 당신의 생애 위로 '{}'의 그림자가 드리웁니다.\" (Polite greeting + card declaration).\n\n",
                request.user_label, card.local_name
            ));
        }
        Lang::En => {
            prompt.push_str(&format!(
                "[Step 1. The Gaze]\n\"Hello, {}. The shadow of '{}' falls across your life.\" (Polite greeting + card declaration).\n\n",
                request.user_label, card.name
            ));
        }
    }

    prompt.push_str(
        "[Step 2. The Essence]\nIdentify ONE core visual symbol of the card and its hidden meaning. Lyrical but brief.\n\n\
         [Step 3. The Value]\nPenetrate the seeker's core values. What belief drives them?\n\n\
         [Step 4. The Acknowledgement]\nState the truth of their nature without praise.\n\n",
    );

    match request.lang {
        Lang::Ko => prompt.push_str(
            "[Bridge]\n\"이제 당신만의 특별한 온기를 불어넣어 보려 합니다. 당신의 소중한 상징들을 들려주시겠어요?\"\n\n",
        ),
        Lang::En => prompt.push_str(
            "[Bridge]\n\"Now it is time to breathe your own warmth into the glass. Will you tell me the symbols you carry?\"\n\n",
        ),
    }

    push_card_context(&mut prompt, request);
    push_invocation(&mut prompt);

    prompt
}

fn build_workshop(request: &DialogueRequest<'_>) -> String {
    let mut prompt = String::new();
    let objects_target = request.target.objects();
    let colors_target = request.target.colors();

    prompt.push_str(COMMON_RULES);
    push_language_rule(&mut prompt, request.lang);

    prompt.push_str(&format!(
        "\n**Goal**: Collaborate to build the stained glass ({} objects + {} colors).\n",
        objects_target, colors_target
    ));
    prompt.push_str(&format!(
        "**Logic (strict {}+{} flow)**:\n\
         1. Count current objects (target: {}).\n\
         2. Count current colors (target: {}).\n\n",
        objects_target, colors_target, objects_target, colors_target
    ));

    prompt.push_str(&format!(
        "**Response guide**:\n\
         - If objects < {}: acknowledge the input briefly and state which piece was just placed and how many remain.\n\
         - If objects == {} and colors == 0: announce that every piece has gathered and ask for the first background color.\n\
         - If objects == {} and colors < {}: acknowledge the color and ask for the next one.\n\
         - If all {} objects and {} colors are collected: declare the cathedral complete (set is_complete: true).\n\n",
        objects_target, objects_target, objects_target, colors_target, objects_target, colors_target
    ));

    prompt.push_str(
        "**Length**: STRICTLY 2-3 sentences. Short, reactive, and cool.\n\
         **No intros**: Do NOT greet or introduce yourself. Just the guide.\n\n\
         ALWAYS append this JSON block at the very end of the reply:\n\
         {\"current_objects\": [...], \"current_colors\": [...], \"is_complete\": true|false}\n\n",
    );

    push_card_context(&mut prompt, request);
    push_collected(&mut prompt, request);
    push_history(&mut prompt, request);

    prompt
}

fn push_language_rule(prompt: &mut String, lang: Lang) {
    match lang {
        Lang::Ko => prompt.push_str("**Language**: Reply in Korean only.\n"),
        Lang::En => prompt.push_str("**Language**: Reply in English only.\n"),
    }
}

fn push_card_context(prompt: &mut String, request: &DialogueRequest<'_>) {
    let card = request.card;
    prompt.push_str("**Context**:\n");
    prompt.push_str(&format!(
        "- Card: {}. {} ({})\n",
        card.id, card.name, card.local_name
    ));
    prompt.push_str(&format!("- Meaning: {}\n", card.meaning));
    prompt.push_str(&format!("- Keywords: {}\n\n", card.keywords.join(", ")));
}

fn push_collected(prompt: &mut String, request: &DialogueRequest<'_>) {
    prompt.push_str("**Collected so far**:\n");
    prompt.push_str(&format!(
        "- Objects: [{}]\n",
        request.collected.objects.join(", ")
    ));
    prompt.push_str(&format!(
        "- Colors: [{}]\n\n",
        request.collected.colors.join(", ")
    ));
}

fn push_history(prompt: &mut String, request: &DialogueRequest<'_>) {
    if request.history.is_empty() {
        return;
    }
    prompt.push_str("**Current conversation**:\n");
    for turn in request.history {
        let role = match turn.speaker {
            Speaker::System => "docent",
            Speaker::User => "user",
        };
        prompt.push_str(&format!("{}: {}\n", role, turn.text));
    }
    prompt.push('\n');
}

fn push_invocation(prompt: &mut String) {
    let mut rng = rand::thread_rng();
    let line = INVOCATIONS
        .choose(&mut rng)
        .copied()
        .unwrap_or(INVOCATIONS[0]);
    prompt.push_str("**Invocation**: ");
    prompt.push_str(line);
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcana;
    use crate::dialogue::{Mode, Turn};
    use crate::elicitation::{Collected, ElicitationTarget};

    fn request<'a>(
        mode: Mode,
        lang: Lang,
        collected: &'a Collected,
        history: &'a [Turn],
    ) -> DialogueRequest<'a> {
        DialogueRequest {
            mode,
            card: arcana::card_by_id(8).unwrap(),
            user_label: "로터스",
            lang,
            target: ElicitationTarget::default(),
            collected,
            history,
        }
    }

    #[test]
    fn reveal_prompt_carries_card_and_label() {
        let collected = Collected::default();
        let prompt = build_prompt(&request(Mode::Reveal, Lang::Ko, &collected, &[]));
        assert!(prompt.contains("로터스"));
        assert!(prompt.contains("힘"));
        assert!(prompt.contains("Keywords: 용기, 인내, 관용, 내면의 힘"));
        assert!(prompt.contains("**Invocation**"));
    }

    #[test]
    fn workshop_prompt_is_parameterized_by_the_target() {
        let collected = Collected {
            objects: vec!["고양이".into()],
            colors: Vec::new(),
        };
        let history = vec![Turn::user("고양이")];
        let prompt = build_prompt(&request(Mode::Workshop, Lang::Ko, &collected, &history));
        assert!(prompt.contains("3 objects + 2 colors"));
        assert!(prompt.contains("current_objects"));
        assert!(prompt.contains("Objects: [고양이]"));
        assert!(prompt.contains("user: 고양이"));
        assert!(!prompt.contains("**Invocation**"));
    }

    #[test]
    fn english_sessions_are_instructed_in_english() {
        let collected = Collected::default();
        let prompt = build_prompt(&request(Mode::Reveal, Lang::En, &collected, &[]));
        assert!(prompt.contains("Reply in English only"));
        assert!(prompt.contains("Strength"));
    }

    #[test]
    fn small_targets_change_the_guide() {
        let collected = Collected::default();
        let mut req = request(Mode::Workshop, Lang::Ko, &collected, &[]);
        req.target = ElicitationTarget::new(1, 1);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("1 objects + 1 colors"));
    }
}
