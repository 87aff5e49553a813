use maud::{html, Markup, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #ffffff; margin: 0; padding: 0 20px; max-width: 560px; margin: 0 auto; }
header { display: flex; align-items: center; gap: 12px; padding: 20px 0; }
header h1 { flex: 1; text-align: center; font-size: 22px; color: #00CE5E; margin: 0; }
.back { text-decoration: none; font-size: 28px; color: #00CE5E; }
.tabs { display: flex; justify-content: center; gap: 10px; margin-bottom: 10px; }
.tab, .download-all { padding: 10px 20px; border-radius: 20px; background: #6EC6B2; color: #ffffff; font-weight: bold; text-decoration: none; }
.tab.selected, .download-all { background: #00CE5E; }
.list { list-style: none; padding: 10px 0; margin: 0; }
.item { display: flex; align-items: center; background: #E6F4F4; padding: 15px; border-radius: 10px; margin-bottom: 10px; }
.item-text { flex: 1; }
.item-title { font-size: 16px; font-weight: bold; }
.item-subtitle { font-size: 14px; color: #3c6e63; }
.banner { background: #fdecea; color: #b3261e; padding: 10px; border-radius: 10px; }
.empty { text-align: center; color: #777; }
.ledger { font-size: 13px; color: #555; }
dl.report dt { font-weight: bold; margin-top: 10px; }
.success { text-align: center; margin-top: 60px; }
.check { font-size: 48px; color: #ffffff; background: #00CE5E; border-radius: 50%; width: 80px; height: 80px; line-height: 80px; margin: 0 auto; }
.ok { display: inline-block; margin: 20px 0; padding: 10px 40px; border-radius: 20px; background: #00CE5E; color: #fff; text-decoration: none; }
"#;

/// Phone-width page with a back link and a centered green title.
pub fn mobile_layout(title: &str, back_href: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                header {
                    @if let Some(href) = back_href {
                        a class="back" href=(href) aria-label="Back" { "‹" }
                    }
                    h1 { (title) }
                }
                (content)
            }
        }
    }
}
