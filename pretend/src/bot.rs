use std::future::Future;

use crate::{Context, Error, Incoming, Result};

/// The bot under test.
///
/// The harness hands every message, enter and leave to [`receive`](Self::receive)
/// and lets the bot answer through its [`Context`]. All methods have default
/// no-op implementations.
///
/// # Example
///
/// ```rust
/// use pretend::{Bot, Context, Incoming, Result};
///
/// struct Greeter;
///
/// impl Bot for Greeter {
///     async fn receive(&mut self, ctx: &Context, incoming: &Incoming) -> Result {
///         if let Incoming::Text(message) = incoming {
///             if message.text() == format!("{} hi", ctx.name()) {
///                 ctx.reply(message, "hi")?;
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
///
/// # Lifecycle
///
/// 1. [`on_start`](Self::on_start) - called by [`Session::start`](crate::Session::start)
/// 2. [`receive`](Self::receive) - called once per delivery, one at a time
/// 3. [`on_shutdown`](Self::on_shutdown) - called by [`Session::shutdown`](crate::Session::shutdown)
pub trait Bot: Send + 'static {
    /// Handle something a user did.
    ///
    /// Runs to completion before the next delivery is handed over.
    fn receive(
        &mut self,
        ctx: &Context,
        incoming: &Incoming,
    ) -> impl Future<Output = Result<()>> + Send {
        let _ = (ctx, incoming);
        async { Ok(()) }
    }

    /// Called when the session starts or restarts.
    fn on_start(&mut self, ctx: &Context) -> impl Future<Output = Result<()>> + Send {
        let _ = ctx;
        async { Ok(()) }
    }

    /// Called once when the session shuts down.
    fn on_shutdown(&mut self, ctx: &Context) -> impl Future<Output = Result<()>> + Send {
        let _ = ctx;
        async { Ok(()) }
    }

    /// Decide what to do with an error returned by [`receive`](Self::receive).
    ///
    /// Return `Ok(())` to swallow it; the default passes it on to whoever
    /// sent the message.
    fn on_error(&self, error: Error) -> Result<()> {
        Err(error)
    }
}
