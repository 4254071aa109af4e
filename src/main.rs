use std::sync::Arc;

use bookings::PgBookingStore;
use config::Config;
use db::get_db_pool;
use error::CalendarError;
use handlers::{handle_callback_query, handle_command, handle_unknown, AppState, Command};
use teloxide::{
    dispatching::{HandlerExt, UpdateFilterExt},
    prelude::*,
};

mod bookings;
mod calendar;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod navigation;
mod render;

extern crate pretty_env_logger;
#[macro_use] extern crate log;

#[tokio::main]
async fn main() -> Result<(), CalendarError> {
    pretty_env_logger::init();

    let config = Config::from_env()?;
    let pool = get_db_pool(&config).await?;
    let state = Arc::new(AppState::new(
        Arc::new(PgBookingStore::new(pool)),
        config.timezone,
    ));
    info!("starting booking calendar bot, days in {}", config.timezone.name());

    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_unknown)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
