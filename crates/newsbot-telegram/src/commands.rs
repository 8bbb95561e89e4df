// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing and execution, independent of the Telegram transport.
//!
//! [`BotContext::execute`] turns a parsed [`Command`] into a list of
//! [`Reply`] values; the dispatcher in [`crate::handler`] renders and sends
//! them. Keeping the two apart lets the command logic run against in-memory
//! suppliers in tests.

use std::sync::Arc;

use newsbot_core::traits::{NewsService, SubscriptionRegistry, UserDirectory};
use newsbot_core::types::{
    Article, FavoriteArticle, MAX_TOPIC_LENGTH, NewUser, Publisher, User,
};
use newsbot_core::{NewsbotError, normalize_topic};
use tracing::{debug, warn};

use crate::format::short_id;
use crate::recent::RecentArticles;

/// Conversation state: the next plain message is a topic to subscribe to.
pub const STATE_AWAITING_TOPIC: &str = "awaiting_topic";
/// Conversation state: the next plain message is a search query.
pub const STATE_AWAITING_SEARCH: &str = "awaiting_search_query";

/// Accepted range for `/interval`, in minutes (one minute to one week).
pub const INTERVAL_RANGE: std::ops::RangeInclusive<u32> = 1..=10_080;
/// Accepted range for `/limit`.
pub const LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

const HELP_TEXT: &str = "Доступные команды:\n\n\
/start - начало работы с ботом\n\
/subscribe &lt;тема&gt; - подписаться на новости по теме\n\
/unsubscribe &lt;тема&gt; - отписаться от темы\n\
/topics - ваши подписки\n\
/news - получить свежие новости по всем подпискам\n\
/topic &lt;тема&gt; - новости по одной теме\n\
/search &lt;запрос&gt; - поиск новостей\n\
/favorites - избранные новости\n\
/reset - сбросить историю отправленных новостей\n\
/interval &lt;минуты&gt; - как часто присылать новости\n\
/limit &lt;число&gt; - сколько новостей присылать за раз\n\
/help - эта справка";

const START_TEXT: &str = "👋 Привет! Я бот для отслеживания новостей.\n\n\
Подпишитесь на интересные темы командой /subscribe, и я буду присылать свежие новости. \
Список всех команд: /help";

const TRY_LATER: &str = "❌ Произошла ошибка. Пожалуйста, попробуйте позже.";
const NOTHING_FOUND: &str = "🔍 Свежих новостей по вашим подпискам не найдено. Попробуйте позже.";

/// A bot command with its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Subscribe(String),
    Unsubscribe(String),
    Topics,
    News,
    Topic(String),
    Search(String),
    Reset,
    Interval(String),
    Limit(String),
    Favorites,
}

impl Command {
    /// Parses `/name[@bot] args`. Returns `None` for non-commands and unknown names.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim().to_string()),
            None => (rest, String::new()),
        };
        let name = match head.split_once('@') {
            Some((name, _bot)) => name,
            None => head,
        };

        let command = match name.to_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "subscribe" => Self::Subscribe(args),
            "unsubscribe" => Self::Unsubscribe(args),
            "topics" | "subscriptions" => Self::Topics,
            "news" => Self::News,
            "topic" => Self::Topic(args),
            "search" => Self::Search(args),
            "reset" => Self::Reset,
            "interval" => Self::Interval(args),
            "limit" => Self::Limit(args),
            "favorites" => Self::Favorites,
            _ => return None,
        };
        Some(command)
    }

    /// A message sent before a slow command runs.
    pub fn progress_message(&self) -> Option<&'static str> {
        match self {
            Self::News => Some("🚀 Ищу свежие новости по вашим подпискам..."),
            Self::Search(q) if !q.is_empty() => Some("🔍 Ищу новости..."),
            Self::Reset => Some("🔄 Сбрасываю историю отправленных новостей..."),
            _ => None,
        }
    }
}

/// Something to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// HTML text.
    Text(String),
    /// An article with an "add to favorites" button.
    Article(Article),
    /// A bookmarked article with a "remove from favorites" button.
    Favorite(FavoriteArticle),
}

/// A favorites button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Favorite(String),
    Unfavorite(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix("fav:") {
            return Some(Self::Favorite(id.to_string()));
        }
        data.strip_prefix("unfav:")
            .map(|id| Self::Unfavorite(id.to_string()))
    }

    pub fn data(&self) -> String {
        match self {
            Self::Favorite(id) => format!("fav:{id}"),
            Self::Unfavorite(id) => format!("unfav:{id}"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Favorite(_) => "⭐ В избранное",
            Self::Unfavorite(_) => "❌ Удалить из избранного",
        }
    }
}

/// Result of handling a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Toast shown to the user.
    pub answer: String,
    /// Button that replaces the pressed one, if the action succeeded.
    pub next: Option<CallbackAction>,
}

impl CallbackOutcome {
    fn failed(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            next: None,
        }
    }
}

/// Everything the command layer needs.
#[derive(Clone)]
pub struct BotContext {
    pub service: Arc<dyn NewsService>,
    pub users: Arc<dyn UserDirectory>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    pub recent: Arc<RecentArticles>,
    /// `[delivery] default_news_limit`, used for users without their own limit.
    pub default_news_limit: u32,
}

fn text(message: impl Into<String>) -> Vec<Reply> {
    vec![Reply::Text(message.into())]
}

impl BotContext {
    /// Loads the user behind a chat, registering them on first contact.
    pub async fn user_for(&self, new: NewUser) -> Result<User, NewsbotError> {
        if let Some(user) = self.users.get_user_by_chat(new.chat_id).await? {
            return Ok(user);
        }
        self.users.find_or_create_user(new).await
    }

    pub async fn execute(&self, user: &User, command: Command) -> Vec<Reply> {
        debug!(user_id = %user.id, command = ?command, "executing command");
        match command {
            Command::Start => text(START_TEXT),
            Command::Help => text(HELP_TEXT),
            Command::Subscribe(topic) if topic.is_empty() => {
                self.await_input(user, STATE_AWAITING_TOPIC, "✍️ Введите тему, на которую хотите подписаться.")
                    .await
            }
            Command::Subscribe(topic) => self.subscribe(user, &topic).await,
            Command::Unsubscribe(topic) => self.unsubscribe(user, &topic).await,
            Command::Topics => self.topics(user).await,
            Command::News => self.news(user).await,
            Command::Topic(topic) => self.topic(user, &topic).await,
            Command::Search(query) if query.is_empty() => {
                self.await_input(user, STATE_AWAITING_SEARCH, "🔍 Введите поисковый запрос.")
                    .await
            }
            Command::Search(query) => self.search(user, &query).await,
            Command::Reset => self.reset(user).await,
            Command::Interval(arg) => self.interval(user, &arg).await,
            Command::Limit(arg) => self.limit(user, &arg).await,
            Command::Favorites => self.favorites(user).await,
        }
    }

    /// Handles a plain (non-command) message according to the user's state.
    pub async fn handle_text(&self, user: &User, message: &str) -> Vec<Reply> {
        let replies = match user.state.as_str() {
            STATE_AWAITING_TOPIC => self.subscribe(user, message).await,
            STATE_AWAITING_SEARCH => self.search(user, message).await,
            _ => return text("Не понимаю. Список команд: /help"),
        };
        self.set_state(user, "").await;
        replies
    }

    pub async fn handle_callback(&self, user: &User, data: &str) -> CallbackOutcome {
        match CallbackAction::parse(data) {
            Some(CallbackAction::Favorite(id)) => self.add_favorite(user, id).await,
            Some(CallbackAction::Unfavorite(id)) => self.remove_favorite(user, id).await,
            None => {
                warn!(data, "unknown callback data");
                CallbackOutcome::failed("Неизвестное действие.")
            }
        }
    }

    async fn set_state(&self, user: &User, state: &str) {
        if let Err(e) = self.users.set_state(user.id, state).await {
            warn!(user_id = %user.id, error = %e, "failed to update conversation state");
        }
    }

    async fn await_input(&self, user: &User, state: &str, prompt: &str) -> Vec<Reply> {
        match self.users.set_state(user.id, state).await {
            Ok(()) => text(prompt),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to update conversation state");
                text(TRY_LATER)
            }
        }
    }

    async fn subscribe(&self, user: &User, topic: &str) -> Vec<Reply> {
        let topic = normalize_topic(topic);
        if topic.is_empty() {
            return text("Вы не ввели тему. Попробуйте снова.");
        }
        if topic.chars().count() > MAX_TOPIC_LENGTH {
            return text(format!(
                "Тема слишком длинная: не более {MAX_TOPIC_LENGTH} символов."
            ));
        }
        match self.subscriptions.add_subscription(user.id, &topic).await {
            Ok(()) => text(format!("👍 Вы подписались на тему: <b>{}</b>", escape(&topic))),
            Err(NewsbotError::Duplicate(_)) => text(format!(
                "Вы уже подписаны на тему <b>{}</b>.",
                escape(&topic)
            )),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to add subscription");
                text(TRY_LATER)
            }
        }
    }

    async fn unsubscribe(&self, user: &User, topic: &str) -> Vec<Reply> {
        let topic = normalize_topic(topic);
        if topic.is_empty() {
            return text("Укажите тему: /unsubscribe &lt;тема&gt;");
        }
        match self.subscriptions.remove_subscription(user.id, &topic).await {
            Ok(()) => text(format!("Вы отписались от темы <b>{}</b>.", escape(&topic))),
            Err(NewsbotError::NotFound(_)) => text(format!(
                "Вы не подписаны на тему <b>{}</b>.",
                escape(&topic)
            )),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to remove subscription");
                text(TRY_LATER)
            }
        }
    }

    async fn topics(&self, user: &User) -> Vec<Reply> {
        match self.subscriptions.list_topics(user.id).await {
            Ok(topics) if topics.is_empty() => {
                text("У вас пока нет подписок. Добавьте тему командой /subscribe.")
            }
            Ok(topics) => {
                let list: Vec<String> = topics.iter().map(|t| format!("• {}", escape(t))).collect();
                text(format!("📋 Ваши подписки:\n\n{}", list.join("\n")))
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to list subscriptions");
                text(TRY_LATER)
            }
        }
    }

    async fn news(&self, user: &User) -> Vec<Reply> {
        match self.service.fetch_now(user).await {
            Ok(0) => text(NOTHING_FOUND),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "on-demand delivery failed");
                text(NOTHING_FOUND)
            }
        }
    }

    async fn topic(&self, user: &User, topic: &str) -> Vec<Reply> {
        if normalize_topic(topic).is_empty() {
            return text("Укажите тему: /topic &lt;тема&gt;");
        }
        let articles = match self.service.fetch_for_topic(topic).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(user_id = %user.id, topic, error = %e, "topic fetch failed");
                return text(TRY_LATER);
            }
        };

        let unseen = self.unseen(user, articles).await;
        if unseen.is_empty() {
            return text(format!(
                "По теме <b>{}</b> новых новостей нет.",
                escape(&normalize_topic(topic))
            ));
        }
        let limit = self.limit_for(user);
        self.mark_and_reply(user, unseen.into_iter().take(limit).collect())
            .await
    }

    async fn search(&self, user: &User, query: &str) -> Vec<Reply> {
        let query = query.trim();
        if query.is_empty() {
            return text("❌ Поисковый запрос не может быть пустым.");
        }
        let articles = match self.service.search(query).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "search failed");
                return text("Произошла ошибка при поиске новостей. Попробуйте позже.");
            }
        };
        if articles.is_empty() {
            return text(format!(
                "🔍 Новостей по запросу <b>{}</b> не найдено. Попробуйте изменить запрос.",
                escape(query)
            ));
        }

        let unseen = self.unseen(user, articles).await;
        if unseen.is_empty() {
            return text(format!(
                "🔍 По запросу <b>{}</b> найдены только новости, которые вы уже получали ранее. \
                 Попробуйте другой запрос или сбросьте историю: /reset",
                escape(query)
            ));
        }

        let found = unseen.len();
        let limit = self.limit_for(user);
        let mut replies = text(format!(
            "📰 Результаты поиска по запросу <b>{}</b>:",
            escape(query)
        ));
        replies.extend(
            self.mark_and_reply(user, unseen.into_iter().take(limit).collect())
                .await,
        );
        if found > limit {
            replies.extend(text(format!(
                "ℹ️ Показано {limit} из {found} найденных новостей. \
                 Увеличьте лимит командой /limit или уточните запрос."
            )));
        }
        replies
    }

    /// Per-cycle article count for `user`, honoring the configured default.
    fn limit_for(&self, user: &User) -> usize {
        user.effective_limit(self.default_news_limit)
    }

    /// Drops articles already sent to `user`. Articles whose history lookup
    /// fails are dropped too.
    async fn unseen(&self, user: &User, articles: Vec<Article>) -> Vec<Article> {
        let mut unseen = Vec::with_capacity(articles.len());
        for article in articles {
            match self.service.is_already_sent(user.id, &article.url).await {
                Ok(false) => unseen.push(article),
                Ok(true) => {}
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "sent check failed, skipping article");
                }
            }
        }
        unseen
    }

    /// Records each article as sent and turns it into a reply.
    async fn mark_and_reply(&self, user: &User, articles: Vec<Article>) -> Vec<Reply> {
        let mut replies = Vec::with_capacity(articles.len());
        for article in articles {
            if let Err(e) = self.service.mark_sent(user.id, &article.url).await {
                warn!(user_id = %user.id, error = %e, "failed to mark article sent");
            }
            replies.push(Reply::Article(article));
        }
        replies
    }

    async fn reset(&self, user: &User) -> Vec<Reply> {
        match self.service.reset_history(user.id).await {
            Ok(()) => text("✅ История отправленных новостей сброшена."),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "history reset failed");
                text(TRY_LATER)
            }
        }
    }

    async fn interval(&self, user: &User, arg: &str) -> Vec<Reply> {
        let Some(minutes) = arg.parse::<u32>().ok().filter(|m| INTERVAL_RANGE.contains(m)) else {
            return text(format!(
                "Укажите интервал в минутах от {} до {}, например: /interval 60",
                INTERVAL_RANGE.start(),
                INTERVAL_RANGE.end()
            ));
        };
        match self.users.update_interval(user.id, minutes).await {
            Ok(()) => text(format!("⏱ Новости будут приходить раз в {minutes} мин.")),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to update interval");
                text(TRY_LATER)
            }
        }
    }

    async fn limit(&self, user: &User, arg: &str) -> Vec<Reply> {
        let Some(limit) = arg.parse::<u32>().ok().filter(|l| LIMIT_RANGE.contains(l)) else {
            return text(format!(
                "Укажите число от {} до {}, например: /limit 5",
                LIMIT_RANGE.start(),
                LIMIT_RANGE.end()
            ));
        };
        match self.users.update_news_limit(user.id, limit).await {
            Ok(()) => text(format!("📰 За раз будет приходить до {limit} новостей.")),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to update news limit");
                text(TRY_LATER)
            }
        }
    }

    async fn favorites(&self, user: &User) -> Vec<Reply> {
        match self.service.list_favorites(user.id).await {
            Ok(favorites) if favorites.is_empty() => text(
                "📭 У вас пока нет избранных новостей. Нажмите «⭐ В избранное» под новостью.",
            ),
            Ok(favorites) => {
                let mut replies = text(format!("📚 Ваши избранные новости ({}):", favorites.len()));
                replies.extend(favorites.into_iter().map(Reply::Favorite));
                replies
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to list favorites");
                text(TRY_LATER)
            }
        }
    }

    async fn add_favorite(&self, user: &User, id: String) -> CallbackOutcome {
        let Some(article) = self.recent.resolve(&id) else {
            debug!(short_id = %id, "favorite button for an expired article");
            return CallbackOutcome::failed("Новость устарела, добавить не получится.");
        };
        match self.service.add_favorite(user.id, &article).await {
            Ok(()) => CallbackOutcome {
                answer: "✅ Статья добавлена в избранное!".into(),
                next: Some(CallbackAction::Unfavorite(id)),
            },
            Err(NewsbotError::Duplicate(_)) => CallbackOutcome {
                answer: "Эта статья уже в избранном.".into(),
                next: Some(CallbackAction::Unfavorite(id)),
            },
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to add favorite");
                CallbackOutcome::failed("Произошла ошибка при добавлении в избранное.")
            }
        }
    }

    async fn remove_favorite(&self, user: &User, id: String) -> CallbackOutcome {
        let favorites = match self.service.list_favorites(user.id).await {
            Ok(favorites) => favorites,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to list favorites");
                return CallbackOutcome::failed("Произошла ошибка при удалении из избранного.");
            }
        };
        let Some(favorite) = favorites.into_iter().find(|f| short_id(&f.article_url) == id) else {
            return CallbackOutcome::failed("Статья не найдена в избранном.");
        };

        match self.service.remove_favorite(user.id, &favorite.article_url).await {
            Ok(()) => {
                // Keep the article resolvable so the user can re-add it.
                self.recent.remember(&article_from_favorite(&favorite));
                CallbackOutcome {
                    answer: "✅ Статья удалена из избранного!".into(),
                    next: Some(CallbackAction::Favorite(id)),
                }
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to remove favorite");
                CallbackOutcome::failed("Произошла ошибка при удалении из избранного.")
            }
        }
    }
}

fn escape(text: &str) -> String {
    crate::format::escape_html(text)
}

fn article_from_favorite(favorite: &FavoriteArticle) -> Article {
    Article {
        title: favorite.title.clone(),
        description: String::new(),
        content: String::new(),
        url: favorite.article_url.clone(),
        image: None,
        published_at: favorite.published_at,
        source: Publisher {
            name: favorite.source.clone(),
            url: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsbot_core::traits::FavoriteStore;
    use newsbot_core::types::UserId;
    use newsbot_delivery::{DeliveryEngine, DeliverySettings, NewsDesk, SeenCache, Suppliers};
    use newsbot_test_utils::{MemoryStore, MockSource, RecordingSink, article, test_user};

    struct Fixture {
        store: MemoryStore,
        source: MockSource,
        sink: RecordingSink,
        ctx: BotContext,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let source = MockSource::new();
        let sink = RecordingSink::new();
        let engine = DeliveryEngine::new(
            Suppliers {
                source: Arc::new(source.clone()),
                ledger: Arc::new(store.clone()),
                subscriptions: Arc::new(store.clone()),
                users: Arc::new(store.clone()),
                favorites: Arc::new(store.clone()),
                sink: Arc::new(sink.clone()),
            },
            Arc::new(SeenCache::default()),
            DeliverySettings::default(),
        );
        let ctx = BotContext {
            service: Arc::new(NewsDesk::new(Arc::new(engine))),
            users: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            recent: Arc::new(RecentArticles::new(100)),
            default_news_limit: 5,
        };
        Fixture {
            store,
            source,
            sink,
            ctx,
        }
    }

    fn texts(replies: &[Reply]) -> Vec<&str> {
        replies
            .iter()
            .filter_map(|r| match r {
                Reply::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_commands_with_arguments_and_bot_suffix() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(
            Command::parse("/subscribe  Rust News "),
            Some(Command::Subscribe("Rust News".into()))
        );
        assert_eq!(
            Command::parse("/search@newsbot космос"),
            Some(Command::Search("космос".into()))
        );
        assert_eq!(Command::parse("/subscriptions"), Some(Command::Topics));
        assert_eq!(Command::parse("/subscribe"), Some(Command::Subscribe(String::new())));
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hello"), None);
    }

    #[test]
    fn callback_data_round_trips() {
        let action = CallbackAction::Favorite("abc".into());
        assert_eq!(CallbackAction::parse(&action.data()), Some(action));
        assert_eq!(
            CallbackAction::parse("unfav:xyz"),
            Some(CallbackAction::Unfavorite("xyz".into()))
        );
        assert_eq!(CallbackAction::parse("other"), None);
    }

    #[tokio::test]
    async fn subscribe_normalizes_and_reports_duplicates() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;

        let first = f.ctx.execute(&user, Command::Subscribe("  RUST ".into())).await;
        assert!(texts(&first)[0].contains("<b>rust</b>"));
        let again = f.ctx.execute(&user, Command::Subscribe("rust".into())).await;
        assert!(texts(&again)[0].contains("уже подписаны"));
        assert_eq!(f.store.list_topics(user.id).await.unwrap(), vec!["rust"]);
    }

    #[tokio::test]
    async fn overlong_topic_is_rejected() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;

        let replies = f
            .ctx
            .execute(&user, Command::Subscribe("x".repeat(MAX_TOPIC_LENGTH + 1)))
            .await;
        assert!(texts(&replies)[0].contains("слишком длинная"));
        assert!(f.store.list_topics(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bare_subscribe_waits_for_topic_message() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;

        f.ctx.execute(&user, Command::Subscribe(String::new())).await;
        let user = f.store.user(user.id).await.unwrap();
        assert_eq!(user.state, STATE_AWAITING_TOPIC);

        f.ctx.handle_text(&user, "Космос").await;
        assert_eq!(f.store.list_topics(user.id).await.unwrap(), vec!["космос"]);
        assert_eq!(f.store.user(user.id).await.unwrap().state, "");
    }

    #[tokio::test]
    async fn news_with_nothing_fresh_says_so() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &["rust"]).await;

        let replies = f.ctx.execute(&user, Command::News).await;
        assert_eq!(texts(&replies), vec![NOTHING_FOUND]);
    }

    #[tokio::test]
    async fn news_delivers_through_the_sink() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &["rust"]).await;
        f.source.set_articles("rust", vec![article("https://a/1")]).await;

        let replies = f.ctx.execute(&user, Command::News).await;
        assert!(replies.is_empty());
        assert_eq!(f.sink.urls_for(user.chat_id).await, vec!["https://a/1"]);
    }

    #[tokio::test]
    async fn topic_browse_skips_sent_and_marks_new() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;
        f.store.seed_sent(user.id, "https://a/1").await;
        f.source
            .set_articles("rust", vec![article("https://a/1"), article("https://a/2")])
            .await;

        let replies = f.ctx.execute(&user, Command::Topic("Rust".into())).await;
        let urls: Vec<&str> = replies
            .iter()
            .filter_map(|r| match r {
                Reply::Article(a) => Some(a.url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(urls, vec!["https://a/2"]);
        assert!(f.store.sent_urls(user.id).await.contains("https://a/2"));

        let again = f.ctx.execute(&user, Command::Topic("rust".into())).await;
        assert!(texts(&again)[0].contains("новых новостей нет"));
    }

    fn article_urls(replies: &[Reply]) -> Vec<&str> {
        replies
            .iter()
            .filter_map(|r| match r {
                Reply::Article(a) => Some(a.url.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn repeated_search_reports_only_seen_results() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;
        f.source
            .set_articles("марс", vec![article("https://m/1"), article("https://m/2")])
            .await;

        let first = f.ctx.execute(&user, Command::Search("марс".into())).await;
        assert_eq!(article_urls(&first), vec!["https://m/1", "https://m/2"]);
        assert!(f.store.sent_urls(user.id).await.contains("https://m/2"));

        let again = f.ctx.execute(&user, Command::Search("марс".into())).await;
        assert!(article_urls(&again).is_empty());
        assert!(texts(&again)[0].contains("уже получали"));
    }

    #[tokio::test]
    async fn search_beyond_limit_reports_shown_of_found() {
        let f = fixture();
        let mut user = test_user(1);
        user.news_limit = 2;
        f.store.add_user(user.clone(), &[]).await;
        f.store.seed_sent(user.id, "https://m/0").await;
        let results = (0..5).map(|i| article(&format!("https://m/{i}"))).collect();
        f.source.set_articles("марс", results).await;

        let replies = f.ctx.execute(&user, Command::Search("марс".into())).await;
        assert_eq!(article_urls(&replies), vec!["https://m/1", "https://m/2"]);
        assert!(texts(&replies).last().unwrap().contains("Показано 2 из 4"));
        assert!(!f.store.sent_urls(user.id).await.contains("https://m/3"));
    }

    #[tokio::test]
    async fn zero_user_limit_uses_configured_default() {
        let mut f = fixture();
        f.ctx.default_news_limit = 3;
        let mut user = test_user(1);
        user.news_limit = 0;
        f.store.add_user(user.clone(), &[]).await;
        let results = (0..6).map(|i| article(&format!("https://r/{i}"))).collect();
        f.source.set_articles("rust", results).await;

        let replies = f.ctx.execute(&user, Command::Topic("rust".into())).await;
        assert_eq!(article_urls(&replies).len(), 3);
    }

    #[tokio::test]
    async fn interval_and_limit_are_validated() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;

        f.ctx.execute(&user, Command::Interval("0".into())).await;
        f.ctx.execute(&user, Command::Limit("abc".into())).await;
        let stored = f.store.user(user.id).await.unwrap();
        assert_eq!(stored.interval_minutes, 60);
        assert_eq!(stored.news_limit, 5);

        f.ctx.execute(&user, Command::Interval("30".into())).await;
        f.ctx.execute(&user, Command::Limit("3".into())).await;
        let stored = f.store.user(user.id).await.unwrap();
        assert_eq!(stored.interval_minutes, 30);
        assert_eq!(stored.news_limit, 3);
    }

    #[tokio::test]
    async fn favorite_buttons_toggle() {
        let f = fixture();
        let user = test_user(1);
        f.store.add_user(user.clone(), &[]).await;
        let a = article("https://example.com/long/article/path");
        let id = f.ctx.recent.remember(&a);

        let added = f.ctx.handle_callback(&user, &format!("fav:{id}")).await;
        assert_eq!(added.next, Some(CallbackAction::Unfavorite(id.clone())));
        assert!(f.store.is_favorite(UserId(1), &a.url).await.unwrap());

        let listed = f.ctx.execute(&user, Command::Favorites).await;
        assert_eq!(listed.len(), 2);

        let removed = f.ctx.handle_callback(&user, &format!("unfav:{id}")).await;
        assert_eq!(removed.next, Some(CallbackAction::Favorite(id)));
        assert!(!f.store.is_favorite(UserId(1), &a.url).await.unwrap());
    }

    #[tokio::test]
    async fn expired_favorite_button_fails_gracefully() {
        let f = fixture();
        let user = test_user(1);
        let outcome = f.ctx.handle_callback(&user, "fav:missing").await;
        assert!(outcome.next.is_none());
    }
}
