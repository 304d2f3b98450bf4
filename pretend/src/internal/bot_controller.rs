use std::{fmt, sync::Arc};

use tokio::sync::{Mutex, MutexGuard};

use crate::{Bot, Context, Incoming, Result};

/// Drives the bot under test: one delivery at a time, errors routed through
/// [`Bot::on_error`]. Shared by the session and every user and room handle.
pub(crate) struct BotController<B: Bot> {
    bot: Arc<Mutex<B>>,
    ctx: Context,
}

impl<B: Bot> Clone for BotController<B> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            ctx: self.ctx.clone(),
        }
    }
}

impl<B: Bot> BotController<B> {
    pub(crate) fn new(bot: B, ctx: Context) -> Self {
        Self {
            bot: Arc::new(Mutex::new(bot)),
            ctx,
        }
    }

    #[inline]
    pub(crate) fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub(crate) async fn bot(&self) -> MutexGuard<'_, B> {
        self.bot.lock().await
    }

    pub(crate) async fn start(&self) -> Result {
        let mut bot = self.bot.lock().await;
        self.ctx.set_alive(true);
        let res = bot.on_start(&self.ctx).await;
        Self::handle_error(&bot, res)
    }

    pub(crate) async fn deliver(&self, incoming: Incoming) -> Result {
        self.ctx.ensure_alive()?;
        let mut bot = self.bot.lock().await;
        let res = bot.receive(&self.ctx, &incoming).await;
        Self::handle_error(&bot, res)
    }

    pub(crate) async fn shutdown(&self) -> Result {
        let mut bot = self.bot.lock().await;
        let res = bot.on_shutdown(&self.ctx).await;
        self.ctx.set_alive(false);
        res
    }

    #[inline]
    fn handle_error(bot: &B, result: Result) -> Result {
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(bot = std::any::type_name::<B>(), error = %e, "bot error");
                bot.on_error(e)
            }
        }
    }
}

impl<B: Bot> fmt::Debug for BotController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotController")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
