/// `ffmpeg` invocation that turns numbered frames into a GIF or MP4.
pub(crate) mod ffmpeg;
/// Numbered frame files in a scratch directory.
pub(crate) mod frames;
