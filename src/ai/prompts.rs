//! Fixed instruction texts sent with each remote call

const TRANSCRIPT_SLOT: &str = "{transcript}";

pub const TRANSCRIPTION_INSTRUCTION: &str =
    "Generate a complete, detailed transcript of this audio. Return only the transcript text.";

pub const POLISH_TEMPLATE: &str = "Take this raw transcription and create a polished, well-formatted note.
Remove filler words (um, uh, like), repetitions, and false starts.
Correct grammar and sentence structure for clarity.
Format any lists or bullet points properly.
Use markdown formatting for headings, lists, etc.
Start with a short `#` heading that summarises the note.
Maintain all the original content and meaning.

Raw transcription:
{transcript}";

pub const ELABORATE_TEMPLATE: &str = "Take this raw transcription and expand it into a detailed, well-structured note.
Keep every point that was made, then add relevant context, explanations and examples where they help.
Organise the result with markdown headings, bullet points and short paragraphs.
Do not invent facts about the speaker or their situation.

Raw transcription:
{transcript}";

pub fn polish_prompt(raw_transcription: &str) -> String {
    POLISH_TEMPLATE.replace(TRANSCRIPT_SLOT, raw_transcription)
}

pub fn elaborate_prompt(raw_transcription: &str) -> String {
    ELABORATE_TEMPLATE.replace(TRANSCRIPT_SLOT, raw_transcription)
}
