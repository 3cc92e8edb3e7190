use braid_api::MAX_DEPTH;
use chrono::{Duration, TimeZone, Utc};
use rand::Rng;

const NUM_USERS: i64 = 5;
const NUM_POSTS: i64 = 3;

const NUM_COMMENTS: usize = 200;
const REPLY_PROBABILITY: f64 = 0.6;
const MIN_COMMENT_WORDS: usize = 4;
const MAX_COMMENT_WORDS: usize = 30;

fn gen_n_items(table: &str, n: usize, mut f: impl FnMut(usize) -> String) {
    println!("INSERT INTO {} VALUES", table);
    for i in 0..n {
        if i != 0 {
            println!(",");
        }
        print!("    {}", f(i));
    }
    println!();
    println!("ON CONFLICT DO NOTHING;");
}

fn main() {
    let mut rng = rand::thread_rng();
    let base = Utc.with_ymd_and_hms(2023, 6, 12, 8, 0, 0).unwrap();

    // (depth, post) of every generated comment; comment number i gets id i + 1
    let mut meta: Vec<(u32, i64)> = Vec::new();

    gen_n_items(
        "comments (comment_id, user_id, post_id, parent_id, text, vote_count, created_at, is_deleted)",
        NUM_COMMENTS,
        |i| {
            // reply to any earlier comment still below the depth limit, or start a new root
            let replyable: Vec<usize> = meta
                .iter()
                .enumerate()
                .filter(|(_, (depth, _))| *depth < MAX_DEPTH)
                .map(|(j, _)| j)
                .collect();
            let parent = match !replyable.is_empty() && rng.gen_bool(REPLY_PROBABILITY) {
                true => Some(replyable[rng.gen_range(0..replyable.len())]),
                false => None,
            };
            let (depth, post) = match parent {
                None => (0, rng.gen_range(1..=NUM_POSTS)),
                Some(p) => (meta[p].0 + 1, meta[p].1),
            };
            meta.push((depth, post));
            format!(
                "({}, {}, {}, {}, '{}', {}, '{}', false)",
                i + 1,
                rng.gen_range(1..=NUM_USERS),
                post,
                match parent {
                    None => String::from("NULL"),
                    Some(p) => (p + 1).to_string(),
                },
                lipsum::lipsum(rng.gen_range(MIN_COMMENT_WORDS..MAX_COMMENT_WORDS)),
                rng.gen_range(-3..40),
                (base + Duration::minutes(i as i64)).format("%Y-%m-%d %H:%M:%S%z"),
            )
        },
    );

    // explicit ids bypass the sequence, so move it past them
    println!();
    println!(
        "SELECT setval('comments_comment_id_seq', {});",
        NUM_COMMENTS
    );
}
