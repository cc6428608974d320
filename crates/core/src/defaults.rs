//! Built-in site content
//!
//! Used twice: as the one-time seed of an empty remote collection, and as
//! the fallback shown when the store is unavailable. The ids here are only
//! meaningful in fallback mode; seeding strips them so the store assigns its own.

use crate::types::{
    Book, BookCategory, ClosedDate, Librarian, MonthlyFeature, NewsItem, Notice, NoticeCategory,
    QuestionType, SurveyQuestion,
};

const PLACEHOLDER_COVER: &str =
    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?q=80&w=400";

/// Default catalog
pub fn initial_books() -> Vec<Book> {
    vec![
        Book {
            id: "1".to_string(),
            title: "静寂の森".to_string(),
            author: "佐藤 かおり".to_string(),
            description: "都会の喧騒を離れ、森の中で見つけた本当の自分。心温まる再生の物語。"
                .to_string(),
            cover_url: PLACEHOLDER_COVER.to_string(),
            category: BookCategory::Novel,
            is_new: true,
            is_recommended: false,
        },
        Book {
            id: "2".to_string(),
            title: "未来への建築".to_string(),
            author: "James Wright".to_string(),
            description: "持続可能な都市開発と、これからの建築家が果たすべき役割について。"
                .to_string(),
            cover_url: "https://images.unsplash.com/photo-1589829085413-56de8ae18c73?q=80&w=400"
                .to_string(),
            category: BookCategory::Technology,
            is_new: true,
            is_recommended: true,
        },
        Book {
            id: "3".to_string(),
            title: "忘れられたレシピ".to_string(),
            author: "祖母山 ツネ".to_string(),
            description: "昭和の食卓を彩った、懐かしくも新しい家庭料理の数々。".to_string(),
            cover_url: "https://images.unsplash.com/photo-1543002588-bfa74002ed7e?q=80&w=400"
                .to_string(),
            category: BookCategory::Cooking,
            is_new: false,
            is_recommended: true,
        },
    ]
}

/// Default newsletter issues
pub fn initial_news() -> Vec<NewsItem> {
    vec![NewsItem {
        id: "n1".to_string(),
        date: "2024-05-15".to_string(),
        title: "図書館通信 5月号".to_string(),
        content: "<p>今月号では、新しく導入された電子書籍端末の使い方を特集しています。</p>"
            .to_string(),
        file_name: "oct_news_2024_05.pdf".to_string(),
        pdf_url: "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf"
            .to_string(),
        preview_image_url: Some(
            "https://images.unsplash.com/photo-1506880018603-83d5b814b5a6?q=80&w=1200&auto=format&fit=crop"
                .to_string(),
        ),
    }]
}

/// Default notices, newest first
pub fn initial_notices() -> Vec<Notice> {
    vec![
        Notice {
            id: "nt1".to_string(),
            date: "2024-05-20".to_string(),
            title: "夏休み期間中の学習室利用について".to_string(),
            category: NoticeCategory::Important,
            content: concat!(
                "<div class=\"rt-h2-style\">学習室の開放時間を延長します</div>",
                "<p>7月21日から8月31日までの期間、学生の皆様の学習支援のため、",
                "学習室の利用時間を以下の通り変更いたします。</p>",
                "<div class=\"rt-box-info\">変更後：9:00 - 21:00（全日）</div>",
                "<p><img src=\"https://images.unsplash.com/photo-1497366216548-37526070297c?q=80&amp;w=600\" ",
                "style=\"width:100%; border-radius: 8px; margin-top: 1em;\" /></p>",
                "<p>席数には限りがございますので、譲り合ってご利用ください。</p>"
            )
            .to_string(),
        },
        Notice {
            id: "nt2".to_string(),
            date: "2024-05-18".to_string(),
            title: "絵本読み聞かせイベント「星空のおはなし会」".to_string(),
            category: NoticeCategory::Event,
            content: concat!(
                "<div class=\"rt-h2-style\">プラネタリウム×絵本</div>",
                "<p>区立科学館とのコラボレーション企画です。満天の星空の下で、",
                "宇宙にまつわる絵本の読み聞かせを行います。</p>",
                "<ul><li>日時：6月15日(土) 14:00〜</li><li>場所：こどもライブラリー</li></ul>"
            )
            .to_string(),
        },
    ]
}

/// Default closing days
pub fn initial_closed_dates() -> Vec<ClosedDate> {
    vec![
        ClosedDate {
            id: "c1".to_string(),
            date: "2024-05-13".to_string(),
            reason: "館内整理日".to_string(),
        },
        ClosedDate {
            id: "c2".to_string(),
            date: "2024-05-27".to_string(),
            reason: "特別整理期間".to_string(),
        },
    ]
}

/// Default monthly feature, written when the singleton document is missing
pub fn initial_feature() -> MonthlyFeature {
    MonthlyFeature {
        title: "珈琲と本".to_string(),
        subtitle: "香り豊かな読書時間".to_string(),
        description:
            "深まる季節、温かいコーヒーを片手にページをめくる至福のひとときをご提案します。"
                .to_string(),
        content: concat!(
            "<div class=\"rt-h2-style\">一杯のコーヒーから始まる物語</div>",
            "<p>かつて文豪たちは喫茶店で名作を書き上げました。本特集では、珈琲の歴史から",
            "美味しい淹れ方、そして喫茶店が舞台の小説まで幅広くご紹介します。</p>",
            "<div class=\"rt-box-quote\">「コーヒーは、地獄のように黒く、死のように強く、恋のように甘い。」</div>",
            "<div class=\"rt-box-cinema\">★ 特設コーナーにて、バリスタ厳選の豆を展示中 ★</div>"
        )
        .to_string(),
        image_url: "https://images.unsplash.com/photo-1495474472287-4d71bcdd2085?q=80&w=1200"
            .to_string(),
        books: vec!["3".to_string(), "1".to_string()],
    }
}

/// Staff profiles
pub fn initial_librarians() -> Vec<Librarian> {
    vec![Librarian {
        name: "本田 栞".to_string(),
        role: "館長".to_string(),
        message: "本との出会いは、新しい世界への扉です。皆様の「知りたい」を全力でサポートします。"
            .to_string(),
        image_url: "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?q=80&w=200"
            .to_string(),
    }]
}

/// Default survey
pub fn initial_survey() -> Vec<SurveyQuestion> {
    vec![SurveyQuestion {
        id: "q1".to_string(),
        text: "図書館の利用頻度はどれくらいですか？".to_string(),
        kind: QuestionType::Choice,
    }]
}

/// Template for a book created from the admin panel
pub fn new_book() -> Book {
    Book {
        id: String::new(),
        title: "新刊タイトル".to_string(),
        author: "著者名".to_string(),
        description: "あらすじを入力...".to_string(),
        cover_url: PLACEHOLDER_COVER.to_string(),
        category: BookCategory::Novel,
        is_new: true,
        is_recommended: false,
    }
}

/// Template for a newsletter issue dated `date`
pub fn new_news_item(date: &str) -> NewsItem {
    NewsItem {
        date: date.to_string(),
        title: "新規通信".to_string(),
        ..Default::default()
    }
}

/// Template for a notice dated `date`
pub fn new_notice(date: &str) -> Notice {
    Notice {
        id: String::new(),
        date: date.to_string(),
        title: "新規お知らせ".to_string(),
        category: NoticeCategory::Info,
        content: String::new(),
    }
}

/// Template for a closing day on `date`
pub fn new_closed_date(date: &str) -> ClosedDate {
    ClosedDate {
        id: String::new(),
        date: date.to_string(),
        reason: "特別休館".to_string(),
    }
}

/// Template for a survey question
pub fn new_survey_question() -> SurveyQuestion {
    SurveyQuestion {
        id: String::new(),
        text: "新しい質問項目".to_string(),
        kind: QuestionType::Text,
    }
}
