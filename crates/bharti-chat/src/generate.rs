use crate::repair::{fallback_payload, ResponseRepairer};
use crate::translate::{translate_answer, Translator};
use bharti_core::{Answer, Intent, Language};
use bharti_llm::LlmClient;
use std::sync::Arc;
use tracing::warn;

const GREETING_PROMPT: &str = "Your name is Bharti. You are an AI assistant for the Indian \
Culture Portal that deals with Indian culture and history. When a user greets you, reply with a \
formal greeting. From time to time you can give a quirky response as well! Your personality is \
of a smartass know-it-all. Add emojis where appropriate, but not too many.";

const GENERAL_PROMPT: &str = "You are Bharti, the AI assistant of the Indian Culture Portal. \
Answer the user's question using only the portal description below and the conversation so far. \
Do not invent features the portal does not have. Keep the answer between 70 and 120 words.";

const SPECIALISED_PROMPT: &str = "You are an AI assistant for the Indian Culture Portal, \
specializing in Indian culture, history, and governance.\n\
\n\
Instructions:\n\
- Answer ONLY based on the provided context. Do not make up information.\n\
- Respond with a JSON array only, no surrounding prose. Each element has the fields \
\"category\", \"description\" and \"resources\" (a list of objects with \"title\" and \"url\").\n\
- Group the context rows by category and summarise each description.\n\
- If a url is NA, do not include that resource.\n\
- If the context is empty, return category entries with empty resources rather than inventing \
any.";

/// Static description of the portal used to ground `General` answers.
/// General answers never consult retrieval.
const KNOWLEDGE_BLURB: &str = "The Indian Culture Portal is a digital repository of India's \
cultural heritage. It hosts e-books, rare books, archives, manuscripts, museum collections, \
photo essays, audio recordings, and articles on forts, festivals, cuisine, textiles and the \
freedom struggle. Content is curated from institutions across India and is freely accessible. \
Bharti, the portal assistant, helps visitors discover catalog entries by topic.";

const CANNOT_UNDERSTAND: &str = "Cannot understand the intent. Please type a proper query";

const GREETING_FALLBACK: &str = "Namaste! I am Bharti, the Indian Culture Portal assistant. \
How can I help you explore India's heritage today?";

const GENERAL_FALLBACK: &str = "I could not generate a response right now. Please try again.";

/// Produces the final answer for a classified, context-resolved message.
///
/// Each intent has its own generation path; all of them terminate in a valid
/// [`Answer`] — model failures degrade to fixed texts or the structured
/// fallback payload, never to an error.
pub struct ResponseGenerator {
    llm: Arc<LlmClient>,
    repairer: ResponseRepairer,
    translator: Arc<dyn Translator>,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<LlmClient>, translator: Arc<dyn Translator>) -> Self {
        let repairer = ResponseRepairer::new(llm.clone());
        Self {
            llm,
            repairer,
            translator,
        }
    }

    /// Generate the answer for one turn.
    ///
    /// `context` is the retrieval payload (possibly empty), `transcript` the
    /// conversation so far, `latest_user_text` the message being answered.
    pub async fn generate(
        &self,
        intent: Intent,
        context: &str,
        transcript: &str,
        latest_user_text: &str,
        language: Language,
    ) -> Answer {
        let draft = match intent {
            Intent::Greeting => self.greeting(latest_user_text).await,
            Intent::General => self.general(transcript, latest_user_text).await,
            // Specialised handles its own translation: the fallback payload
            // is already localized and must stay byte-fixed.
            Intent::Specialised => {
                return self.specialised(context, latest_user_text, language).await
            }
            Intent::Unknown => Answer::Text(CANNOT_UNDERSTAND.to_string()),
        };
        translate_answer(self.translator.as_ref(), draft, language).await
    }

    async fn greeting(&self, latest_user_text: &str) -> Answer {
        match self.llm.complete(Some(GREETING_PROMPT), latest_user_text).await {
            Ok(text) => Answer::Text(text),
            Err(e) => {
                warn!(error = %e, "Greeting generation failed, using fixed greeting");
                Answer::Text(GREETING_FALLBACK.to_string())
            }
        }
    }

    async fn general(&self, transcript: &str, latest_user_text: &str) -> Answer {
        let prompt = format!(
            "Portal description:\n{KNOWLEDGE_BLURB}\n\nConversation so far:\n{transcript}\n\
             User question: {latest_user_text}"
        );
        match self.llm.complete(Some(GENERAL_PROMPT), &prompt).await {
            Ok(text) => Answer::Text(text),
            Err(e) => {
                warn!(error = %e, "General generation failed, using fixed text");
                Answer::Text(GENERAL_FALLBACK.to_string())
            }
        }
    }

    async fn specialised(
        &self,
        context: &str,
        latest_user_text: &str,
        language: Language,
    ) -> Answer {
        let prompt = format!("context: {context}\nUser question: {latest_user_text}");
        let sections = match self.llm.complete(Some(SPECIALISED_PROMPT), &prompt).await {
            Ok(raw) => self.repairer.ensure_structured(&raw).await,
            Err(e) => {
                warn!(error = %e, "Specialised generation failed, using fallback payload");
                None
            }
        };
        match sections {
            Some(sections) => {
                translate_answer(
                    self.translator.as_ref(),
                    Answer::Structured(sections),
                    language,
                )
                .await
            }
            // The fallback is final: already localized, never re-translated.
            None => Answer::Structured(fallback_payload(language)),
        }
    }
}
