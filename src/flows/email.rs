//! Email flows: the full dictation flow and the quick template flow.

use crate::contacts::ContactBook;
use crate::dialogue::{ask, DialogueContext, DialogueSession};
use crate::email::{EmailSender, Template};
use crate::extract;
use crate::speech::{SpeechInput, SpeechOutput};

fn resolve_recipient(
    text: &str,
    prompt: &str,
    contacts: &mut ContactBook,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> std::result::Result<(String, Option<String>), String> {
    let name = match extract::recipient_name(text) {
        Some(name) => name,
        None => {
            output.speak(prompt);
            match ask(
                dialogue,
                input,
                output,
                DialogueContext::EmailRecipient,
                None,
                max_retries,
            ) {
                Some(name) => name,
                None => return Err("I didn't catch the recipient name.".to_owned()),
            }
        }
    };
    let email = contacts.find_email(&name, input, output);
    Ok((name, email))
}

/// Full email creation: recipient, subject, body, send.
pub fn create_email(
    text: &str,
    contacts: &mut ContactBook,
    sender: &dyn EmailSender,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> String {
    let (name, email) = match resolve_recipient(
        text,
        "Who would you like to send an email to?",
        contacts,
        dialogue,
        input,
        output,
        max_retries,
    ) {
        Ok(resolved) => resolved,
        Err(reply) => return reply,
    };
    let Some(email) = email else {
        return format!("Could not find or get email address for {name}.");
    };

    output.speak("What should the subject be?");
    let Some(subject) = ask(
        dialogue,
        input,
        output,
        DialogueContext::EmailSubject,
        None,
        max_retries,
    ) else {
        return "Email subject is required.".to_owned();
    };

    output.speak("What should the email say?");
    let Some(content) = ask(
        dialogue,
        input,
        output,
        DialogueContext::EmailContent,
        None,
        max_retries,
    ) else {
        return "Email content is required.".to_owned();
    };

    sender.send(&email, &subject, &content)
}

/// Quick template email: pick a template, fill in the topic, send.
pub fn quick_email(
    text: &str,
    contacts: &mut ContactBook,
    sender: &dyn EmailSender,
    sender_name: &str,
    dialogue: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    max_retries: u32,
) -> String {
    let template = Template::from_command(text);

    let (name, email) = match resolve_recipient(
        text,
        "Who should I send the email to?",
        contacts,
        dialogue,
        input,
        output,
        max_retries,
    ) {
        Ok(resolved) => resolved,
        Err(reply) => return reply,
    };
    let Some(email) = email else {
        return format!("Could not find email for {name}.");
    };

    let topic = if template.wants_topic() {
        output.speak("What is the email about?");
        ask(
            dialogue,
            input,
            output,
            DialogueContext::EmailTopic,
            None,
            max_retries,
        )
        .unwrap_or_default()
    } else {
        String::new()
    };

    let subject = template.subject(&name, &topic);
    let body = template.body(&name, &topic, sender_name);
    sender.send(&email, &subject, &body)
}
