mod bot_controller;

pub(crate) use bot_controller::BotController;
