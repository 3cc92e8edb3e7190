use anyhow::Context;
use braid_client::{
    api::{build_tree, CommentId, CommentNode, NewComment, PostId, Transport, UpdateVote, UserId},
    HttpApi,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the braid server, eg. http://localhost:3000
    #[structopt(short, long)]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Post a comment (a reply if --parent is given)
    Post {
        user_id: i64,
        post_id: i64,
        text: String,

        /// Comment to reply to
        #[structopt(long)]
        parent: Option<i64>,
    },

    /// List comments, flat json or threaded
    List {
        post_id: Option<i64>,

        /// Render as an indented reply tree instead of json
        #[structopt(long)]
        tree: bool,
    },

    /// Fetch a single comment
    Get { comment_id: i64 },

    /// Set a comment's vote count (absolute value)
    Vote { comment_id: i64, vote_count: i64 },

    /// Delete a comment and its whole reply subtree
    Delete { comment_id: i64 },
}

fn print_thread(nodes: &[CommentNode]) {
    for node in nodes {
        println!(
            "{}#{} [{}{}] {}",
            "    ".repeat(node.depth as usize),
            node.record.id.0,
            if node.record.vote_count >= 0 { "+" } else { "" },
            node.record.vote_count,
            node.record.text,
        );
        print_thread(&node.children);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();

    let mut api = HttpApi::new(opt.host);

    match opt.cmd {
        Command::Post {
            user_id,
            post_id,
            text,
            parent,
        } => {
            let comment = api
                .create_comment(&NewComment {
                    user_id: UserId(user_id),
                    post_id: PostId(post_id),
                    parent_id: parent.map(CommentId),
                    text,
                })
                .await
                .context("creating comment")?;
            println!("created comment {}", comment.id.0);
        }
        Command::List { post_id, tree } => {
            let comments = api
                .list_comments(post_id.map(PostId))
                .await
                .context("listing comments")?;
            if tree {
                print_thread(&build_tree(comments));
            } else {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&comments).context("rendering comments")?
                );
            }
        }
        Command::Get { comment_id } => {
            let comment = api
                .get_comment(CommentId(comment_id))
                .await
                .context("fetching comment")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&comment).context("rendering comment")?
            );
        }
        Command::Vote {
            comment_id,
            vote_count,
        } => {
            api.update_vote(&UpdateVote {
                comment_id: CommentId(comment_id),
                vote_count,
            })
            .await
            .context("updating vote count")?;
        }
        Command::Delete { comment_id } => {
            api.delete_comment(CommentId(comment_id))
                .await
                .context("deleting comment")?;
        }
    }

    Ok(())
}
