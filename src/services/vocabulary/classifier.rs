use crate::model::context::{Context, GENERAL};

/// Picks the context whose keywords occur most often in `text`.
///
/// Each keyword counts once, by substring containment in the lower-cased text.
/// On a tie the context that comes first in `contexts` (insertion order) wins.
/// Without any hit the answer is General.
pub fn classify<'a>(contexts: &'a [Context], text: &str) -> &'a str {
    let text_lower = text.to_lowercase();

    let mut best: Option<(&Context, usize)> = None;

    for ctx in contexts {
        let hits = ctx.keyword_hits(&text_lower);
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= hits => {}
            _ => best = Some((ctx, hits)),
        }
    }

    match best {
        Some((ctx, hits)) => {
            log::debug!("classified as {:?} ({hits} keyword hits)", ctx.name);
            ctx.name.as_str()
        }
        None => GENERAL,
    }
}
