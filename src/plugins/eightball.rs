//! Magic 8-ball.

use super::Plugin;
use crate::command::{Command, CommandContext, CommandSpec, IrcCommand};
use crate::error::{CommandError, CommandResult};
use async_trait::async_trait;
use rand::seq::SliceRandom;

pub const ANSWERS: &[&str] = &[
    "It is certain.",
    "It is decidedly so.",
    "Without a doubt.",
    "Yes, definitely.",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

pub struct EightBallPlugin;

impl Plugin for EightBallPlugin {
    fn name(&self) -> &str {
        "8ball"
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(EightBall)]
    }
}

pub struct EightBall;

fn answer() -> &'static str {
    ANSWERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Ask again later.")
}

#[async_trait]
impl IrcCommand for EightBall {
    fn create(&self, spec: &mut CommandSpec) {
        spec.add_trigger("8ball");
        spec.add_trigger("magic8ball");
        spec.set_access_level(0);
    }

    async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult {
        if parameters.trim().is_empty() {
            return Err(CommandError::NeedMoreParams("8ball <question>".into()));
        }
        ctx.reply(&format!("{}: {}", ctx.nick, answer()));
        Ok(())
    }

    fn help(&self, _parameters: &str) -> &str {
        "Answers a yes-or-no question. Syntax: 8ball <question>"
    }
}
