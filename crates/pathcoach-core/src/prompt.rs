//! Prompt construction for the text-generation API.
//!
//! Each builder returns a [`ChatPrompt`]: a fixed system role plus a user
//! message that embeds every state field and names the exact JSON object the
//! model must answer with. Output is requested in Ukrainian and addressed to
//! the user in the second person.

use crate::names::formal_name;
use crate::types::{CurrentState, DesiredState, Domain, UserInfo};
use std::fmt::Write as _;

pub const PLAN_SYSTEM_ROLE: &str = "Ти - дружній, підбадьорливий коуч з особистого розвитку. \
Говориш просто, позитивно і мотивуюче, без складних термінів і наукових посилань. \
Завжди звертаєшся до людини на \"ти\", неформально, як до друга.";

pub const SONG_SYSTEM_ROLE: &str = "Ти - автор пісень у стилі поп-рок. \
Пишеш енергійні, життєрадісні тексти з чітким ритмом і приспівом, що легко запам'ятовується.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

const PLAN_SHAPE: &str = r#"{
  "summary": "коротке резюме плану",
  "reasoning": "обґрунтування підходу",
  "timeframe": "загальні часові рамки",
  "steps": [
    { "title": "назва кроку", "description": "опис кроку з прикладами", "timeframe": "коли завершити крок" }
  ]
}"#;

const SONG_SHAPE: &str = r#"{
  "title": "Назва пісні",
  "lyrics": "Текст пісні: куплети, приспів, міст"
}"#;

pub fn plan_prompt(current: &CurrentState, desired: &DesiredState, user: &UserInfo) -> ChatPrompt {
    let mut p = String::new();
    let _ = writeln!(
        p,
        "Створи дружній, мотивуючий план дій для {}.",
        addressee(user)
    );
    p.push_str("Звертайся напряму, у другій особі (ти, твій, тобі).\n\n");
    write_states(&mut p, current, desired);
    let _ = writeln!(
        p,
        "\nПлан має бути реалістичним на термін: {}.",
        desired.timeframe_or_default()
    );
    p.push_str(
        "Дай 5-7 конкретних практичних кроків, кожен з прикладами і власними часовими рамками.\n",
    );
    p.push_str("\nВідповідай українською мовою, лише одним JSON-об'єктом такої форми:\n");
    p.push_str(PLAN_SHAPE);
    p.push('\n');

    ChatPrompt {
        system: PLAN_SYSTEM_ROLE.to_string(),
        user: p,
    }
}

pub fn song_prompt(current: &CurrentState, desired: &DesiredState, user: &UserInfo) -> ChatPrompt {
    let mut p = String::new();
    let _ = writeln!(
        p,
        "Напиши життєрадісну мотиваційну пісню у стилі поп-рок для {}.",
        addressee(user)
    );
    p.push('\n');
    write_states(&mut p, current, desired);
    p.push_str(
        "\nСтруктура: куплет про поточний стан, куплет про мрії, приспів із закликом до дії, \
         міст із надією, куплет про конкретні кроки, повтор приспіву.\n",
    );
    p.push_str("\nВідповідай лише одним JSON-об'єктом такої форми:\n");
    p.push_str(SONG_SHAPE);
    p.push('\n');

    ChatPrompt {
        system: SONG_SYSTEM_ROLE.to_string(),
        user: p,
    }
}

/// "Оля (повне ім'я: Ольга, вік: 29, стать: жіноча)".
fn addressee(user: &UserInfo) -> String {
    let name = user.name.trim();
    let formal = formal_name(name, user.is_feminine());
    let mut s = name.to_string();
    s.push_str(" (");
    if formal != name {
        let _ = write!(s, "повне ім'я: {formal}, ");
    }
    let _ = write!(s, "вік: {}, стать: {})", user.age.trim(), user.gender.trim());
    s
}

fn write_states(p: &mut String, current: &CurrentState, desired: &DesiredState) {
    p.push_str("ПОТОЧНИЙ СТАН:\n");
    for &d in Domain::all() {
        let _ = writeln!(p, "- {}: {}", d.label(), current.domain(d).trim());
    }
    if !current.needs_to_solve.trim().is_empty() {
        let _ = writeln!(p, "- Що потрібно вирішити: {}", current.needs_to_solve.trim());
    }
    p.push_str("\nБАЖАНИЙ СТАН:\n");
    for &d in Domain::all() {
        let _ = writeln!(p, "- {}: {}", d.label(), desired.domain(d).trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> (CurrentState, DesiredState, UserInfo) {
        let current = CurrentState {
            emotional: "тривога".into(),
            mental: "розфокус".into(),
            career: "застій".into(),
            relationships: "самотність".into(),
            physical: "втома".into(),
            needs_to_solve: String::new(),
        };
        let desired = DesiredState {
            emotional: "спокій".into(),
            mental: "ясність".into(),
            career: "нова роль".into(),
            relationships: "близькість".into(),
            physical: "енергія".into(),
            timeframe: "3 місяці".into(),
        };
        (current, desired, UserInfo::new("Оля", "29", "жіноча"))
    }

    #[test]
    fn plan_prompt_embeds_every_field() {
        let (current, desired, user) = inputs();
        let prompt = plan_prompt(&current, &desired, &user);
        for &d in Domain::all() {
            assert!(prompt.user.contains(current.domain(d)));
            assert!(prompt.user.contains(desired.domain(d)));
        }
        assert!(prompt.user.contains("3 місяці"));
        assert!(prompt.user.contains("Оля"));
        assert!(prompt.user.contains("Ольга"));
        assert!(prompt.user.contains("\"steps\""));
        assert_eq!(prompt.system, PLAN_SYSTEM_ROLE);
    }

    #[test]
    fn needs_to_solve_only_when_present() {
        let (mut current, desired, user) = inputs();
        assert!(!plan_prompt(&current, &desired, &user)
            .user
            .contains("Що потрібно вирішити"));
        current.needs_to_solve = "безсоння".into();
        assert!(plan_prompt(&current, &desired, &user)
            .user
            .contains("Що потрібно вирішити: безсоння"));
    }

    #[test]
    fn song_prompt_requests_title_and_lyrics() {
        let (current, desired, user) = inputs();
        let prompt = song_prompt(&current, &desired, &user);
        assert!(prompt.user.contains("\"lyrics\""));
        assert!(prompt.user.contains("втома"));
        assert_eq!(prompt.system, SONG_SYSTEM_ROLE);
    }

    #[test]
    fn unknown_name_has_no_formal_suffix() {
        let (current, desired, _) = inputs();
        let user = UserInfo::new("Богдан", "40", "чоловіча");
        let prompt = plan_prompt(&current, &desired, &user);
        assert!(prompt.user.contains("Богдан (вік: 40"));
    }
}
