//! Mental-health self-check: ten fixed questions, four options each
//! (0 = best … 3 = worst), scored locally into current/desired narratives.
//!
//! Scoring is deterministic and never touches the network. Per domain the
//! relevant answers are compared against the "worst" threshold (`> 2`) and
//! one of three canned narratives is chosen.

use crate::error::{CoachError, Result};
use crate::types::{CurrentState, DesiredState, DEFAULT_TIMEFRAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub struct Question {
    pub id: u8,
    pub text: &'static str,
    pub options: [&'static str; 4],
}

pub static QUESTIONS: &[Question] = &[
    Question {
        id: 1,
        text: "Як часто ти відчуваєш стрес або тривогу?",
        options: ["Рідко або ніколи", "Іноді", "Досить часто", "Майже весь час"],
    },
    Question {
        id: 2,
        text: "Як ти оцінюєш якість свого сну?",
        options: ["Відмінна", "Добра", "Задовільна", "Погана"],
    },
    Question {
        id: 3,
        text: "Як часто ти почуваєшся виснаженим або без енергії?",
        options: ["Рідко або ніколи", "Іноді", "Досить часто", "Майже весь час"],
    },
    Question {
        id: 4,
        text: "Наскільки легко тобі зосередитися на завданнях?",
        options: ["Дуже легко", "Легко", "Не завжди легко", "Важко"],
    },
    Question {
        id: 5,
        text: "Чи радіє тобі те, що раніше приносило задоволення?",
        options: ["Так, повною мірою", "Здебільшого так", "Не так як раніше", "Майже ні"],
    },
    Question {
        id: 6,
        text: "Як ти оцінюєш свою продуктивність у роботі чи навчанні?",
        options: ["Відмінна", "Добра", "Задовільна", "Низька"],
    },
    Question {
        id: 7,
        text: "Наскільки тебе влаштовують стосунки з близькими?",
        options: ["Повністю", "Здебільшого", "Частково", "Не влаштовують"],
    },
    Question {
        id: 8,
        text: "Як часто ти рухаєшся: спорт, прогулянки, активний відпочинок?",
        options: [
            "Регулярно (3-5 разів на тиждень)",
            "Час від часу (1-2 рази на тиждень)",
            "Рідко",
            "Майже ніколи",
        ],
    },
    Question {
        id: 9,
        text: "Наскільки ти задоволений своїм професійним розвитком?",
        options: ["Дуже задоволений", "Здебільшого задоволений", "Частково", "Не задоволений"],
    },
    Question {
        id: 10,
        text: "Як часто ти практикуєш релаксацію або медитацію?",
        options: ["Регулярно", "Час від часу", "Рідко", "Ніколи"],
    },
];

/// Question id → selected option index.
pub type Answers = BTreeMap<u8, u8>;

pub fn question(id: u8) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Reject unknown question ids and option indexes outside `0..4`.
pub fn validate_answers(answers: &Answers) -> Result<()> {
    for (&id, &option) in answers {
        let q = question(id).ok_or(CoachError::UnknownQuestion(id))?;
        if usize::from(option) >= q.options.len() {
            return Err(CoachError::InvalidAnswer {
                question: id,
                option,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub current_state: CurrentState,
    pub desired_state: DesiredState,
}

/// Three-way bucket used to pick a narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Struggling,
    Mixed,
    Good,
}

const WORST: u8 = 2;

fn bad(score: u8) -> bool {
    score > WORST
}

/// Both answers bad → struggling; one bad → mixed; none → good.
fn pair_level(a: u8, b: u8) -> Level {
    match (bad(a), bad(b)) {
        (true, true) => Level::Struggling,
        (true, false) | (false, true) => Level::Mixed,
        (false, false) => Level::Good,
    }
}

fn emotional_level(stress: u8, sleep: u8, joy: u8) -> Level {
    if bad(stress) || bad(sleep) {
        Level::Struggling
    } else if bad(joy) {
        Level::Mixed
    } else {
        Level::Good
    }
}

fn relationships_level(score: u8) -> Level {
    if bad(score) {
        Level::Struggling
    } else if score == WORST {
        Level::Mixed
    } else {
        Level::Good
    }
}

/// Score answers into current and desired state narratives. Unanswered
/// questions count as the best option.
pub fn score(answers: &Answers) -> Result<QuizOutcome> {
    validate_answers(answers)?;
    let a = |id: u8| answers.get(&id).copied().unwrap_or(0);

    let (stress, sleep, energy, focus, joy) = (a(1), a(2), a(3), a(4), a(5));
    let (productivity, relationships, exercise, career) = (a(6), a(7), a(8), a(9));

    let emotional = emotional_level(stress, sleep, joy);
    let mental = pair_level(focus, energy);
    let career = pair_level(productivity, career);
    let relationships = relationships_level(relationships);
    let physical = pair_level(exercise, energy);

    Ok(QuizOutcome {
        current_state: CurrentState {
            emotional: pick(&EMOTIONAL_NOW, emotional),
            mental: pick(&MENTAL_NOW, mental),
            career: pick(&CAREER_NOW, career),
            relationships: pick(&RELATIONSHIPS_NOW, relationships),
            physical: pick(&PHYSICAL_NOW, physical),
            needs_to_solve: String::new(),
        },
        desired_state: DesiredState {
            emotional: pick(&EMOTIONAL_GOAL, emotional),
            mental: pick(&MENTAL_GOAL, mental),
            career: pick(&CAREER_GOAL, career),
            relationships: pick(&RELATIONSHIPS_GOAL, relationships),
            physical: pick(&PHYSICAL_GOAL, physical),
            timeframe: DEFAULT_TIMEFRAME.to_string(),
        },
    })
}

/// `[struggling, mixed, good]`
type Narratives = [&'static str; 3];

fn pick(texts: &Narratives, level: Level) -> String {
    let i = match level {
        Level::Struggling => 0,
        Level::Mixed => 1,
        Level::Good => 2,
    };
    texts[i].to_string()
}

static EMOTIONAL_NOW: Narratives = [
    "Ти відчуваєш багато стресу й тривоги, а сон не завжди відновлює. Через це емоційно ти часто на межі виснаження.",
    "Стрес під контролем, але те, що раніше тішило, зараз дає менше радості. Це перший сигнал емоційної втоми.",
    "Твій емоційний стан здебільшого рівний: ти справляєшся зі стресом, добре спиш і вмієш радіти звичним речам.",
];

static EMOTIONAL_GOAL: Narratives = [
    "Знизити рівень стресу, налагодити сон і щодня мати хоч трохи часу на те, що приносить радість.",
    "Повернути смак до життя: знайти нові джерела натхнення, хобі та практику вдячності.",
    "Зберегти емоційний баланс і додати нові способи підтримувати себе у складні періоди.",
];

static MENTAL_NOW: Narratives = [
    "Тобі часто важко зосередитися, а ментальної енергії бракує. Це заважає працювати і приймати рішення.",
    "Концентрація то з'являється, то зникає, особливо коли ти втомлений. Ресурс є, але він швидко вичерпується.",
    "Ти добре концентруєшся, маєш достатньо ментальної енергії і зазвичай приймаєш зважені рішення.",
];

static MENTAL_GOAL: Narratives = [
    "Повернути ясність і фокус: коротка щоденна практика уважності, спокійне робоче місце, регулярні паузи на відновлення.",
    "Стабілізувати концентрацію: планувати складні задачі на пікові години й відновлювати енергію до того, як вона скінчиться.",
    "Підтримувати гостроту розуму новими викликами і творчими задачами.",
];

static CAREER_NOW: Narratives = [
    "Ти незадоволений професійним розвитком і помічаєш, що продуктивність впала. Чіткого шляху вперед поки не видно.",
    "Результати є, але ти відчуваєш, що можеш більше. Продуктивність коливається, і хочеться більше задоволення від роботи.",
    "Ти задоволений своєю роботою і розвитком, працюєш продуктивно і відчуваєш реалізацію.",
];

static CAREER_GOAL: Narratives = [
    "Переосмислити професійний шлях: визначити свої сильні сторони й скласти конкретний план розвитку.",
    "Прибрати те, що забирає продуктивність, і знайти нові джерела мотивації в роботі.",
    "Рости далі: нова спеціалізація, ширша професійна мережа або менторство.",
];

static RELATIONSHIPS_NOW: Narratives = [
    "Стосунки з близькими потребують уваги: бракує глибини, розуміння чи підтримки, а розмови даються важко.",
    "Стосунки здебільшого добрі, але деякі зв'язки хочеться поглибити і спілкуватися відвертіше.",
    "У тебе теплі, підтримуючі стосунки: ти відчуваєш розуміння і вмієш розв'язувати конфлікти.",
];

static RELATIONSHIPS_GOAL: Narratives = [
    "Навчитися говорити про свої потреби, уважно слухати і будувати здорові межі з близькими.",
    "Приділяти більше часу важливим людям і сміливіше відкриватися їм.",
    "Далі вкладатися у близькі зв'язки і розширювати коло спілкування.",
];

static PHYSICAL_NOW: Narratives = [
    "Ти майже не рухаєшся і часто почуваєшся без сил. Це б'є по самопочуттю та стійкості до стресу.",
    "Фізична активність нерегулярна, і енергії іноді бракує. Тілу потрібно більше руху та якісного відпочинку.",
    "Ти регулярно рухаєшся і маєш достатньо енергії на день.",
];

static PHYSICAL_GOAL: Narratives = [
    "Почати з коротких легких тренувань, знайти рух, який подобається, і налагодити сон та харчування.",
    "Скласти реалістичний розклад тренувань і збалансувати навантаження з відпочинком.",
    "Урізноманітнити тренування і поставити нову фізичну ціль.",
];
