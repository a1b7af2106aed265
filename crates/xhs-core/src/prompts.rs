//! Prompt templates, one builder per generation command.

use crate::domain::Language;

pub fn title(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位小红书爆款标题专家。请围绕主题「{topic}」生成 10 个吸睛的小红书标题，\
             适当使用 emoji 和数字，每个标题不超过 20 个字。直接输出标题列表，每行一个，不要有多余解释。"
        ),
        Language::En => format!(
            "You are an expert in viral Xiaohongshu titles. Write 10 eye-catching titles about \"{topic}\", \
             using emoji and numbers where they help, each under 20 words. Output one title per line with no extra explanation."
        ),
    }
}

pub fn post(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位小红书高赞博主。请围绕主题「{topic}」写一篇完整的小红书图文笔记，\
             包含吸引人的开头、分段正文（适当使用 emoji）和结尾互动引导，语气真实自然，像朋友分享。"
        ),
        Language::En => format!(
            "You are a popular Xiaohongshu creator. Write a complete post about \"{topic}\" with a hook opening, \
             short paragraphs (emoji welcome) and a closing question that invites comments. Keep the tone casual and genuine."
        ),
    }
}

pub fn tags(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "请为小红书主题「{topic}」推荐 15 个热门标签，兼顾大流量词和精准长尾词，\
             格式为 #标签，用空格分隔，不要有多余解释。"
        ),
        Language::En => format!(
            "Suggest 15 trending Xiaohongshu hashtags for \"{topic}\", mixing broad high-traffic tags with precise long-tail ones. \
             Format them as #tag separated by spaces with no extra explanation."
        ),
    }
}

pub fn cover(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位小红书封面设计师。请为主题「{topic}」写 5 条封面文案，每条不超过 12 个字，\
             冲击力强、适合大字叠在图片上。每行一条，第一行放最推荐的一条，不要有多余解释。"
        ),
        Language::En => format!(
            "You design Xiaohongshu covers. Write 5 short cover lines for \"{topic}\", each under 8 words and punchy enough \
             to sit in large type over a photo. One per line, best one first, no extra explanation."
        ),
    }
}

pub fn covertext(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "请为主题「{topic}」生成 5 组小红书叠字标题（主标题 + 副标题两行叠放），\
             主标题 4 到 8 个字，副标题补充卖点。每组之间空一行，不要有多余解释。"
        ),
        Language::En => format!(
            "Write 5 stacked Xiaohongshu cover headlines for \"{topic}\": a 2 to 5 word main line plus a sub line with the selling point. \
             Leave a blank line between groups and add no extra explanation."
        ),
    }
}

pub fn abtest(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位小红书爆款内容专家。请围绕主题「{topic}」，分别用三种不同风格各生成一组完整的小红书内容（每组包含：标题、正文、标签），风格要求如下：\n\n\
             A. 真实生活流：内容自然真实，像朋友间的真实分享。\n\
             B. 猎奇冲突流：内容有反转、冲突感，能激发好奇心。\n\
             C. 情绪感染流：内容有强烈代入感和情绪渲染。\n\n\
             每组内容请严格按照如下格式输出：\n\
             【风格A】\n标题：...\n正文：...\n标签：#... #... #...\n\
             【风格B】\n标题：...\n正文：...\n标签：#... #... #...\n\
             【风格C】\n标题：...\n正文：...\n标签：#... #... #...\n\n\
             三组内容之间用\"===\"分隔，不要有任何多余解释。"
        ),
        Language::En => format!(
            "You are an expert in viral Xiaohongshu content. For the topic \"{topic}\", write three complete posts \
             (title, body, tags) in three different styles:\n\n\
             A. Real life: natural, like a friend sharing.\n\
             B. Twist: a reversal or conflict that sparks curiosity.\n\
             C. Emotional: strong empathy and mood.\n\n\
             Use exactly this format:\n\
             [Style A]\nTitle: ...\nBody: ...\nTags: #... #... #...\n\
             [Style B]\nTitle: ...\nBody: ...\nTags: #... #... #...\n\
             [Style C]\nTitle: ...\nBody: ...\nTags: #... #... #...\n\n\
             Separate the three groups with \"===\" and add no extra explanation."
        ),
    }
}

pub fn reply(comment: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位亲切的小红书博主。粉丝在笔记下留言：「{comment}」。\
             请给出 3 条不同语气的回复（热情、专业、俏皮），每条独立成行，不要有多余解释。"
        ),
        Language::En => format!(
            "You are a friendly Xiaohongshu creator. A follower commented: \"{comment}\". \
             Write 3 replies in different tones (warm, expert, playful), one per line, with no extra explanation."
        ),
    }
}

pub fn hook(topic: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "你是一位小红书高互动博主。请为主题「{topic}」生成3条自然真实、有互动引导性的评论语句，\
             适合放在笔记结尾引导用户留言。直接输出3条评论，每条独立成行，不要有多余解释。"
        ),
        Language::En => format!(
            "You are a Xiaohongshu creator with a very engaged audience. For the topic \"{topic}\", write 3 natural closing lines \
             that invite readers to comment. Output the 3 lines, one per line, with no extra explanation."
        ),
    }
}
