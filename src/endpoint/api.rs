//! Concrete endpoint constructors and their wire models.
//!
//! Paths and header presets mirror the backend contract: JSON bodies for structured
//! writes, `Accept: */*` for status-only calls, multipart for image uploads. All
//! authenticated constructors take the current [`TokenPair`] so the bearer header is
//! stamped at build time; the gateway re-invokes them after a token refresh.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	endpoint::{Endpoint, EndpointError, MultipartBody, ResourceKind},
};

/// Social sign-in request forwarded to the backend's identity exchange.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
	/// Identity platform (`apple`, `kakao`, ...).
	pub social_provider: String,
	/// Identity token issued by the platform.
	pub provider_token: String,
	/// Email address tied to the identity.
	pub email: String,
}

/// Sign-up request carrying the chosen profile.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
	/// Identity platform (`apple`, `kakao`, ...).
	pub social_provider: String,
	/// Identity token issued by the platform.
	pub provider_token: String,
	/// Email address tied to the identity.
	pub email: String,
	/// Requested nickname.
	pub nickname: String,
	/// Optional profile image URL from the upload endpoint.
	pub image: Option<String>,
}

/// Profile fields editable after sign-up.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEditRequest {
	/// New nickname.
	pub nickname: String,
	/// New profile image URL, if changed.
	pub image: Option<String>,
}

/// Signed-in user's profile.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	/// Server-side user identifier.
	pub user_id: i64,
	/// Display nickname.
	pub nickname: String,
	/// Profile image URL.
	pub image: Option<String>,
}

/// Meet group summary.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetResponse {
	/// Meet identifier.
	pub meet_id: i64,
	/// Display name.
	pub meet_name: String,
	/// Cover image URL.
	pub meet_image: Option<String>,
	/// Number of members.
	pub member_count: u32,
	/// Days since the most recent plan, when one exists.
	pub last_plan_day: Option<i64>,
}

/// Scheduled plan.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
	/// Plan identifier.
	pub plan_id: i64,
	/// Owning meet identifier.
	pub meet_id: i64,
	/// Display name.
	pub plan_name: String,
	/// Scheduled time, RFC 3339.
	pub plan_time: String,
	/// Number of participants.
	pub participant_count: u32,
	/// Meeting place label.
	pub address: Option<String>,
}

/// Home-screen payload listing upcoming plans.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlanResponse {
	/// Upcoming plans across all meets.
	pub plans: Vec<PlanResponse>,
}

/// Fields accepted when creating or updating a plan.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
	/// Plan identifier; absent on creation.
	pub plan_id: Option<i64>,
	/// Owning meet identifier.
	pub meet_id: i64,
	/// Display name.
	pub plan_name: String,
	/// Scheduled time, RFC 3339.
	pub plan_time: String,
	/// Meeting place label.
	pub address: Option<String>,
}

/// Post-event review.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
	/// Review identifier.
	pub review_id: i64,
	/// Owning meet identifier.
	pub meet_id: i64,
	/// Name of the reviewed plan.
	pub plan_name: String,
	/// Uploaded image URLs.
	pub images: Vec<String>,
}

/// Comment on a plan or review post.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
	/// Comment identifier.
	pub comment_id: i64,
	/// Author identifier.
	pub writer_id: i64,
	/// Author nickname.
	pub writer_name: String,
	/// Comment text.
	pub contents: String,
	/// Creation time, RFC 3339.
	pub created_at: String,
}

// Auth.

/// Exchanges a social identity for a token pair.
pub fn sign_in(request: &SignInRequest) -> Result<Endpoint<TokenPair>, EndpointError> {
	Endpoint::post("auth/sign-in").json_body(request)
}

/// Registers a new account and returns its first token pair.
pub fn sign_up(request: &SignUpRequest) -> Result<Endpoint<TokenPair>, EndpointError> {
	Endpoint::post("auth/sign-up").json_body(request)
}

/// Exchanges the refresh token for a fresh pair.
///
/// The refresh secret travels in the body, not the bearer header; this is the one
/// descriptor built by the refresh coordinator instead of a gateway factory.
pub fn reissue_token(refresh: &TokenSecret) -> Result<Endpoint<TokenPair>, EndpointError> {
	Endpoint::post("auth/recreate")
		.refresh_auth()
		.json_body(&serde_json::json!({ "refreshToken": refresh.expose() }))
}

// User.

/// Fetches the signed-in user's profile.
pub fn user_info(pair: &TokenPair) -> Endpoint<UserInfo> {
	Endpoint::get("user/info").bearer(&pair.access_token).resource(ResourceKind::User, 0)
}

/// Updates the signed-in user's profile.
pub fn update_profile(
	pair: &TokenPair,
	request: &ProfileEditRequest,
) -> Result<Endpoint<UserInfo>, EndpointError> {
	Endpoint::patch("user/info").bearer(&pair.access_token).json_body(request)
}

/// Checks whether a nickname is already taken.
pub fn check_nickname(name: &str) -> Endpoint<bool> {
	Endpoint::get("user/nickname/duplicate").query("nickname", name)
}

/// Requests a server-generated nickname suggestion.
pub fn random_nickname() -> Endpoint<String> {
	Endpoint::get("user/nickname/random")
}

/// Registers the device push token.
pub fn save_device_token(
	pair: &TokenPair,
	device_token: &str,
) -> Result<Endpoint<()>, EndpointError> {
	Ok(Endpoint::post("token/save")
		.accept_all()
		.bearer(&pair.access_token)
		.json_body(&serde_json::json!({ "token": device_token, "subscribe": true }))?
		.discarding())
}

// Meets.

/// Fields accepted when creating a meet.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetRequest {
	/// Display name.
	pub meet_name: String,
	/// Cover image URL, if uploaded.
	pub meet_image: Option<String>,
}

/// Creates a meet group.
pub fn create_meet(
	pair: &TokenPair,
	request: &CreateMeetRequest,
) -> Result<Endpoint<MeetResponse>, EndpointError> {
	Endpoint::post("meet/create").bearer(&pair.access_token).json_body(request)
}

/// Lists the user's meet groups.
pub fn meet_list(pair: &TokenPair) -> Endpoint<Vec<MeetResponse>> {
	Endpoint::get("meet/list").bearer(&pair.access_token)
}

/// Fetches one meet.
pub fn meet_detail(pair: &TokenPair, meet_id: i64) -> Endpoint<MeetResponse> {
	Endpoint::get(format!("meet/{meet_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Meet, meet_id)
}

// Plans.

/// Fetches one plan.
pub fn plan_detail(pair: &TokenPair, plan_id: i64) -> Endpoint<PlanResponse> {
	Endpoint::get(format!("plan/detail/{plan_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Plan, plan_id)
}

/// Fetches the home-screen view of upcoming plans.
pub fn recent_plans(pair: &TokenPair) -> Endpoint<RecentPlanResponse> {
	Endpoint::get("plan/view").bearer(&pair.access_token)
}

/// Lists the plans of one meet.
pub fn meet_plans(pair: &TokenPair, meet_id: i64) -> Endpoint<Vec<PlanResponse>> {
	Endpoint::get(format!("plan/list/{meet_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Meet, meet_id)
}

/// Joins a plan.
pub fn join_plan(pair: &TokenPair, plan_id: i64) -> Endpoint<()> {
	Endpoint::post(format!("plan/join/{plan_id}"))
		.accept_all()
		.bearer(&pair.access_token)
		.resource(ResourceKind::Plan, plan_id)
		.discarding()
}

/// Leaves a plan.
pub fn leave_plan(pair: &TokenPair, plan_id: i64) -> Endpoint<()> {
	Endpoint::delete(format!("plan/leave/{plan_id}"))
		.accept_all()
		.bearer(&pair.access_token)
		.resource(ResourceKind::Plan, plan_id)
		.discarding()
}

/// Creates a plan.
pub fn create_plan(
	pair: &TokenPair,
	request: &PlanRequest,
) -> Result<Endpoint<PlanResponse>, EndpointError> {
	Endpoint::post("plan/create").bearer(&pair.access_token).json_body(request)
}

/// Updates a plan.
pub fn update_plan(
	pair: &TokenPair,
	request: &PlanRequest,
) -> Result<Endpoint<PlanResponse>, EndpointError> {
	Endpoint::patch("plan/update").bearer(&pair.access_token).json_body(request)
}

// Reviews.

/// Lists the reviews of one meet.
pub fn meet_reviews(pair: &TokenPair, meet_id: i64) -> Endpoint<Vec<ReviewResponse>> {
	Endpoint::get(format!("review/list/{meet_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Meet, meet_id)
}

/// Fetches one review.
pub fn review_detail(pair: &TokenPair, review_id: i64) -> Endpoint<ReviewResponse> {
	Endpoint::get(format!("review/{review_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Review, review_id)
}

/// Uploads review images as a multipart form.
pub fn upload_review_images(
	pair: &TokenPair,
	review_id: i64,
	images: Vec<Vec<u8>>,
) -> Endpoint<()> {
	let mut body = MultipartBody::new().text("reviewId", review_id.to_string());

	for (index, image) in images.into_iter().enumerate() {
		body = body.file("images", format!("image-{index}.jpg"), "image/jpeg", image);
	}

	Endpoint::post("image/review/review")
		.bearer(&pair.access_token)
		.multipart_body(body)
		.resource(ResourceKind::Review, review_id)
		.discarding()
}

// Comments.

/// Lists the comments under a post.
pub fn comment_list(pair: &TokenPair, post_id: i64) -> Endpoint<Vec<CommentResponse>> {
	Endpoint::get(format!("comment/{post_id}"))
		.bearer(&pair.access_token)
		.resource(ResourceKind::Comment, post_id)
}

/// Creates a comment and returns the refreshed thread.
pub fn create_comment(
	pair: &TokenPair,
	post_id: i64,
	contents: &str,
) -> Result<Endpoint<Vec<CommentResponse>>, EndpointError> {
	Endpoint::post(format!("comment/{post_id}"))
		.bearer(&pair.access_token)
		.json_body(&serde_json::json!({ "contents": contents }))
}

/// Edits a comment and returns the refreshed thread.
pub fn update_comment(
	pair: &TokenPair,
	post_id: i64,
	comment_id: i64,
	contents: &str,
) -> Result<Endpoint<Vec<CommentResponse>>, EndpointError> {
	Ok(Endpoint::patch(format!("comment/{post_id}/{comment_id}"))
		.bearer(&pair.access_token)
		.json_body(&serde_json::json!({ "contents": contents }))?
		.resource(ResourceKind::Comment, comment_id))
}

/// Deletes a comment.
pub fn delete_comment(pair: &TokenPair, comment_id: i64) -> Endpoint<()> {
	Endpoint::delete(format!("comment/{comment_id}"))
		.accept_all()
		.bearer(&pair.access_token)
		.resource(ResourceKind::Comment, comment_id)
		.discarding()
}
