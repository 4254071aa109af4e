use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, ReplyMarkup},
    utils::command::BotCommands,
};

use crate::bookings::{get_calendar_data, BookingStore, CalendarData};
use crate::calendar::YearMonth;
use crate::error::CalendarResult;
use crate::navigation::{is_calendar_path, parse_calendar_path};
use crate::render::{
    day_entries, month_keyboard, parse_day_callback, render_day_text, render_month_text, IGNORE,
};

const LOAD_FAILED: &str = "Could not load bookings right now. Please try again later.";
const UNKNOWN_COMMAND: &str = "Unknown command. Try /calendar or /help.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start the bot.")]
    Start,
    #[command(description = "display this text.")]
    Help,
    #[command(description = "show bookings for a month: /calendar [year] [month]")]
    Calendar(String),
}

/// Everything a handler needs; shared read-only across updates.
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(store: Arc<dyn BookingStore>, timezone: Tz) -> Self {
        AppState { store, timezone }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> CalendarResult<()> {
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Calendar(args) => {
            let mut args = args.split_whitespace();
            let year = args.next();
            let month = args.next();
            let year_month = YearMonth::from_query(year, month, state.today());
            info!("chat {} opened calendar for {}", chat_id.0, year_month.name());

            if let Some(data) = load_calendar(&bot, chat_id, &state, year_month).await? {
                let keyboard = month_keyboard(year_month, &data, state.today());
                bot.send_message(chat_id, render_month_text(year_month, &data))
                    .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
                    .await?;
            }
        }
    }

    Ok(())
}

pub async fn handle_unknown(bot: Bot, msg: Message) -> CalendarResult<()> {
    debug!("unhandled message in chat {}: {:?}", msg.chat.id.0, msg.text());
    bot.send_message(msg.chat.id, UNKNOWN_COMMAND).await?;
    Ok(())
}

pub async fn handle_callback_query(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> CalendarResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    if data == IGNORE {
        return Ok(());
    }

    let chat_id = message.chat().id;
    let today = state.today();
    debug!("callback query in chat {}: {}", chat_id.0, data);

    if is_calendar_path(data) {
        let Some(year_month) = parse_calendar_path(data, today) else {
            warn!("could not parse calendar path {:?}", data);
            return Ok(());
        };
        if let Some(calendar) = load_calendar(&bot, chat_id, &state, year_month).await? {
            bot.edit_message_text(chat_id, message.id(), render_month_text(year_month, &calendar))
                .reply_markup(month_keyboard(year_month, &calendar, today))
                .await?;
        }
    } else if let Some(day) = parse_day_callback(data) {
        let year_month = YearMonth::containing(day);
        if let Some(calendar) = load_calendar(&bot, chat_id, &state, year_month).await? {
            let entries = day_entries(&calendar.bookings, day);
            bot.send_message(chat_id, render_day_text(day, &entries))
                .await?;
        }
    } else {
        warn!("unknown callback data {:?}", data);
    }

    Ok(())
}

/// Runs the fetch pipeline; on a store failure the chat is told and `None`
/// comes back so the caller renders nothing.
async fn load_calendar(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    year_month: YearMonth,
) -> CalendarResult<Option<CalendarData>> {
    match get_calendar_data(state.store.as_ref(), year_month, &state.timezone).await {
        Ok(data) => Ok(Some(data)),
        Err(e) => {
            error!("failed to load bookings for {}: {}", year_month.name(), e);
            bot.send_message(chat_id, LOAD_FAILED).await?;
            Ok(None)
        }
    }
}
