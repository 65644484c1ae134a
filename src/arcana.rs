//! Major Arcana registry and the birthdate reduction.

use serde::Serialize;

/// One of the 22 fixed card identities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcanaCard {
    pub id: u8,
    pub name: &'static str,
    pub local_name: &'static str,
    pub meaning: &'static str,
    pub keywords: [&'static str; 4],
}

#[derive(Debug, thiserror::Error)]
#[error("invalid birthdate: expected 8 digits (YYYYMMDD)")]
pub struct InvalidBirthdate;

pub static MAJOR_ARCANA: [ArcanaCard; 22] = [
    ArcanaCard {
        id: 0,
        name: "The Fool",
        local_name: "바보",
        meaning: "새로운 시작, 모험, 순수함, 자유로운 영혼",
        keywords: ["자유", "시작", "가능성", "순수"],
    },
    ArcanaCard {
        id: 1,
        name: "The Magician",
        local_name: "마법사",
        meaning: "창조력, 자신감, 의지, 능숙함",
        keywords: ["창조", "능력", "실행", "독창성"],
    },
    ArcanaCard {
        id: 2,
        name: "The High Priestess",
        local_name: "여사제",
        meaning: "직관, 신비, 지혜, 내면의 목소리",
        keywords: ["직관", "지혜", "신비", "통찰"],
    },
    ArcanaCard {
        id: 3,
        name: "The Empress",
        local_name: "여황제",
        meaning: "풍요, 모성, 자연, 예술적 감각",
        keywords: ["풍요", "사랑", "아름다움", "창조"],
    },
    ArcanaCard {
        id: 4,
        name: "The Emperor",
        local_name: "황제",
        meaning: "권위, 구조, 안정, 리더십",
        keywords: ["권위", "책임", "안정", "질서"],
    },
    ArcanaCard {
        id: 5,
        name: "The Hierophant",
        local_name: "교황",
        meaning: "전통, 가르침, 신념, 영적 지도자",
        keywords: ["전통", "지혜", "가르침", "신념"],
    },
    ArcanaCard {
        id: 6,
        name: "The Lovers",
        local_name: "연인",
        meaning: "사랑, 조화, 선택, 결합",
        keywords: ["사랑", "선택", "조화", "관계"],
    },
    ArcanaCard {
        id: 7,
        name: "The Chariot",
        local_name: "전차",
        meaning: "승리, 의지, 행동, 목표 달성",
        keywords: ["승리", "의지", "추진력", "도전"],
    },
    ArcanaCard {
        id: 8,
        name: "Strength",
        local_name: "힘",
        meaning: "내면의 힘, 인내, 용기, 포용",
        keywords: ["용기", "인내", "관용", "내면의 힘"],
    },
    ArcanaCard {
        id: 9,
        name: "The Hermit",
        local_name: "은둔자",
        meaning: "성찰, 고독, 탐구, 내면의 빛",
        keywords: ["성찰", "지혜", "탐구", "고독"],
    },
    ArcanaCard {
        id: 10,
        name: "Wheel of Fortune",
        local_name: "운명의 수레바퀴",
        meaning: "변화, 운명, 순환, 새로운 기회",
        keywords: ["운명", "변화", "기회", "흐름"],
    },
    ArcanaCard {
        id: 11,
        name: "Justice",
        local_name: "정의",
        meaning: "공정, 균형, 진실, 책임",
        keywords: ["정의", "균형", "진실", "판단"],
    },
    ArcanaCard {
        id: 12,
        name: "The Hanged Man",
        local_name: "매달린 사람",
        meaning: "희생, 새로운 관점, 인내, 깨달음",
        keywords: ["희생", "관점", "인내", "깨달음"],
    },
    ArcanaCard {
        id: 13,
        name: "Death",
        local_name: "죽음",
        meaning: "종결, 새로운 시작, 변화, 재탄생",
        keywords: ["변화", "종결", "재탄생", "이별"],
    },
    ArcanaCard {
        id: 14,
        name: "Temperance",
        local_name: "절제",
        meaning: "균형, 조화, 인내, 절제된 행동",
        keywords: ["조화", "균형", "절제", "치유"],
    },
    ArcanaCard {
        id: 15,
        name: "The Devil",
        local_name: "악마",
        meaning: "유혹, 속박, 욕망, 물질적 집착",
        keywords: ["욕망", "유혹", "집착", "본능"],
    },
    ArcanaCard {
        id: 16,
        name: "The Tower",
        local_name: "탑",
        meaning: "급격한 변화, 붕괴, 깨달음, 해방",
        keywords: ["변화", "충격", "해방", "재건"],
    },
    ArcanaCard {
        id: 17,
        name: "The Star",
        local_name: "별",
        meaning: "희망, 영감, 평온, 치유",
        keywords: ["희망", "영감", "치유", "비전"],
    },
    ArcanaCard {
        id: 18,
        name: "The Moon",
        local_name: "달",
        meaning: "불안, 환상, 직관, 잠재의식",
        keywords: ["직관", "상상", "불안", "꿈"],
    },
    ArcanaCard {
        id: 19,
        name: "The Sun",
        local_name: "태양",
        meaning: "성공, 기쁨, 활력, 긍정",
        keywords: ["성공", "기쁨", "활력", "긍정"],
    },
    ArcanaCard {
        id: 20,
        name: "Judgement",
        local_name: "심판",
        meaning: "부활, 소명, 각성, 새로운 판단",
        keywords: ["부활", "각성", "결단", "소명"],
    },
    ArcanaCard {
        id: 21,
        name: "The World",
        local_name: "세계",
        meaning: "완성, 통합, 성취, 완벽한 조화",
        keywords: ["완성", "성취", "통합", "여행"],
    },
];

pub fn card_by_id(id: u8) -> Option<&'static ArcanaCard> {
    MAJOR_ARCANA.get(id as usize)
}

/// Reduce an 8-digit birthdate to its Major Arcana card.
///
/// Non-digit characters are stripped first; the remainder must be exactly
/// 8 digits. The digit sum is reduced until it is at most 22, and a final
/// value of 22 wraps to 0 (The Fool).
pub fn life_path(birthdate: &str) -> Result<&'static ArcanaCard, InvalidBirthdate> {
    let digits: Vec<u32> = birthdate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 8 {
        return Err(InvalidBirthdate);
    }

    let mut sum: u32 = digits.iter().sum();
    while sum > 22 {
        sum = digit_sum(sum);
    }
    if sum == 22 {
        sum = 0;
    }

    Ok(&MAJOR_ARCANA[sum as usize])
}

fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}
