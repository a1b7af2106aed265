//! User-facing text in both supported languages.

use crate::domain::Language;

/// Fixed messages with no interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Msg {
    Welcome,
    Menu,
    Help,
    EmptyKeyword,
    GenerationFailed,
    GenerationTimeout,
    NotConfigured,
    NoHistory,
    NothingPending,
    FullTextTip,
    FullTextButton,
    MenuButton,
    HistoryButton,
}

pub fn text(lang: Language, msg: Msg) -> &'static str {
    match lang {
        Language::Zh => zh(msg),
        Language::En => en(msg),
    }
}

fn zh(msg: Msg) -> &'static str {
    match msg {
        Msg::Welcome => "👋 欢迎使用小红书文案助手！\n发送 /menu 查看全部功能，或直接试试 /title 奶茶店开业",
        Msg::Menu => "🧃 小红书文案助手\n\
            /title 主题 - 爆款标题\n\
            /post 主题 - 图文正文\n\
            /tags 主题 - 热门标签\n\
            /cover 主题 - 封面文案\n\
            /covertext 主题 - 叠字标题\n\
            /batch 主题1,主题2 - 批量标题\n\
            /abtest 主题 - A/B 三种风格\n\
            /reply 评论 - 评论回复\n\
            /hook 主题 - 评论引导语\n\
            /export 主题 - 整合导出\n\
            /coverhint 主题 - 封面图建议\n\
            /search 关键词 - 搜索历史\n\
            /history - 最近记录\n\
            /xhs-help - 使用说明",
        Msg::Help => "📖 使用说明\n\
            1. 命令后加空格和主题，例如 /post 周末露营\n\
            2. /batch 用逗号分隔多个主题\n\
            3. 内容较长时先显示预览，回复「全文」查看完整内容\n\
            4. /export 会整合同一主题下最近生成的标题、封面、正文和标签",
        Msg::EmptyKeyword => "❌ 关键词不能为空，例如 /search 奶茶",
        Msg::GenerationFailed => "❌ 生成失败，请稍后再试。",
        Msg::GenerationTimeout => "⏱ 请求超时，Gemini 响应过慢。请稍后重试或换个主题。",
        Msg::NotConfigured => "⚙️ 生成服务尚未配置（缺少 GEMINI_API_KEY），请联系管理员。",
        Msg::NoHistory => "📭 暂无历史记录。",
        Msg::NothingPending => "没有待展开的内容。",
        Msg::FullTextTip => "……（内容较长，回复「全文」查看完整内容）",
        Msg::FullTextButton => "📄 查看全文",
        Msg::MenuButton => "📋 功能菜单",
        Msg::HistoryButton => "🕘 历史记录",
    }
}

fn en(msg: Msg) -> &'static str {
    match msg {
        Msg::Welcome => "👋 Welcome to the Xiaohongshu copywriting assistant!\nSend /menu to see everything, or try /title bubble tea shop opening",
        Msg::Menu => "🧃 Xiaohongshu copywriting assistant\n\
            /title topic - catchy titles\n\
            /post topic - full post\n\
            /tags topic - trending tags\n\
            /cover topic - cover copy\n\
            /covertext topic - overlay headline\n\
            /batch t1,t2 - titles for several topics\n\
            /abtest topic - three A/B styles\n\
            /reply comment - reply to a comment\n\
            /hook topic - comment prompts\n\
            /export topic - combined note\n\
            /coverhint topic - cover image idea\n\
            /search keyword - search history\n\
            /history - recent records\n\
            /xhs-help - usage notes",
        Msg::Help => "📖 Usage\n\
            1. Put a space and a topic after the command, e.g. /post weekend camping\n\
            2. /batch takes several topics separated by commas\n\
            3. Long replies show a preview first; reply FULLTEXT to see the rest\n\
            4. /export combines the latest title, cover, post and tags for one topic",
        Msg::EmptyKeyword => "❌ The keyword cannot be empty, e.g. /search coffee",
        Msg::GenerationFailed => "❌ Generation failed, please try again later.",
        Msg::GenerationTimeout => "⏱ The request timed out. Please retry in a moment or try another topic.",
        Msg::NotConfigured => "⚙️ Generation is not configured (GEMINI_API_KEY missing). Please contact the operator.",
        Msg::NoHistory => "📭 No history yet.",
        Msg::NothingPending => "There is nothing to expand.",
        Msg::FullTextTip => "… (reply FULLTEXT to see the rest)",
        Msg::FullTextButton => "📄 Full text",
        Msg::MenuButton => "📋 Menu",
        Msg::HistoryButton => "🕘 History",
    }
}

pub fn argument_required(lang: Language, command: &str) -> String {
    match lang {
        Language::Zh => format!("❌ 请在 /{command} 后面加上主题，例如 /{command} 奶茶店开业"),
        Language::En => format!("❌ /{command} needs a topic, e.g. /{command} bubble tea shop"),
    }
}

pub fn did_you_mean(lang: Language, suggestion: &str) -> String {
    match lang {
        Language::Zh => format!("🤔 你是不是想输入 /{suggestion} ？"),
        Language::En => format!("🤔 Did you mean /{suggestion}?"),
    }
}

pub fn no_results(lang: Language, keyword: &str) -> String {
    match lang {
        Language::Zh => format!("🔍 没有找到包含「{keyword}」的记录。"),
        Language::En => format!("🔍 No records matching \"{keyword}\"."),
    }
}

pub fn search_header(lang: Language, keyword: &str, shown: usize, total: usize) -> String {
    match lang {
        Language::Zh => format!("🔍 「{keyword}」共 {total} 条，最近 {shown} 条："),
        Language::En => format!("🔍 {total} match(es) for \"{keyword}\", latest {shown}:"),
    }
}

pub fn history_header(lang: Language, shown: usize) -> String {
    match lang {
        Language::Zh => format!("🕘 最近 {shown} 条记录："),
        Language::En => format!("🕘 Latest {shown} record(s):"),
    }
}

pub fn export_header(lang: Language, topic: &str) -> String {
    match lang {
        Language::Zh => format!("📒 小红书笔记整合 - {topic}"),
        Language::En => format!("📒 Combined note - {topic}"),
    }
}

/// One piece of an exported note, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportSection {
    Title,
    Cover,
    Post,
    Tags,
}

impl ExportSection {
    pub const ALL: [ExportSection; 4] = [
        ExportSection::Title,
        ExportSection::Cover,
        ExportSection::Post,
        ExportSection::Tags,
    ];

    /// History `command_type` the section is read from.
    pub fn command(self) -> &'static str {
        match self {
            ExportSection::Title => "title",
            ExportSection::Cover => "cover",
            ExportSection::Post => "post",
            ExportSection::Tags => "tags",
        }
    }
}

pub fn export_section(lang: Language, section: ExportSection) -> &'static str {
    match (lang, section) {
        (Language::Zh, ExportSection::Title) => "✍️ 爆款标题",
        (Language::Zh, ExportSection::Cover) => "🎨 封面文案",
        (Language::Zh, ExportSection::Post) => "📝 图文内容",
        (Language::Zh, ExportSection::Tags) => "🏷️ 热门标签",
        (Language::En, ExportSection::Title) => "✍️ Titles",
        (Language::En, ExportSection::Cover) => "🎨 Cover copy",
        (Language::En, ExportSection::Post) => "📝 Post",
        (Language::En, ExportSection::Tags) => "🏷️ Tags",
    }
}

pub fn export_nothing(lang: Language, topic: &str) -> String {
    match lang {
        Language::Zh => format!("❌ 未找到与主题「{topic}」相关的内容，请先生成标题、封面文案、正文或标签。"),
        Language::En => format!("❌ Nothing generated for \"{topic}\" yet. Run /title, /cover, /post or /tags first."),
    }
}

pub fn cover_hint(lang: Language, topic: &str, cover_line: &str) -> String {
    match lang {
        Language::Zh => format!(
            "🖼 建议使用{topic}相关的实景照片（如门店外观、产品陈列、活动现场等），叠加封面文案「{cover_line}」，整体风格要吸睛、有氛围感。"
        ),
        Language::En => format!(
            "🖼 Use a real photo related to {topic} (storefront, product display or the event itself) with the cover text \"{cover_line}\" overlaid. Aim for an eye-catching, atmospheric look."
        ),
    }
}

pub fn cover_missing(lang: Language, topic: &str) -> String {
    match lang {
        Language::Zh => format!("❌ 未找到「{topic}」的封面文案，请先运行 /cover {topic}"),
        Language::En => format!("❌ No cover copy for \"{topic}\" yet. Run /cover {topic} first."),
    }
}
