//! Prompt templates sent to the chat model.

use itertools::Itertools;

use crate::recipe::RecipeInfo;

/// Marker the compression prompt asks for when nothing in a passage is relevant
pub const NO_OUTPUT: &str = "NO_OUTPUT";

/// Prompt for the main conversational answer
#[inline]
pub fn answer_prompt(context: &str, chat_history: &str, question: &str) -> String {
    format!(
        "You are a helpful recipe assistant. Use the following context to answer the question.
If you don't know the answer, just say that you don't know. Don't try to make up an answer.

When describing recipes, follow these guidelines:
1. Write a concise description (150-200 words) that includes:
   - Main ingredients and their key characteristics
   - Cooking method and technique highlights
   - Flavor profile and texture
   - Serving suggestions
   - Any unique or special features
2. Avoid repetition and generic phrases
3. Focus on what makes the recipe special
4. Use descriptive but concise language
5. Only state facts that appear in the context

Context: {context}

Chat History:
{chat_history}

Question: {question}

Answer:"
    )
}

/// Prompt asking the model to keep only the parts of a passage relevant to the question
#[inline]
pub fn compression_prompt(question: &str, passage: &str) -> String {
    format!(
        "Given the following question and context, extract any part of the context *AS IS* that is relevant to answer the question. If none of the context is relevant return {NO_OUTPUT}.

Remember, *DO NOT* edit the extracted parts of the context.

> Question: {question}
> Context:
>>>
{passage}
>>>
Extracted relevant parts:"
    )
}

/// Prompt for a single recipe's description in the formatted summary
#[inline]
pub fn description_prompt(recipe: &RecipeInfo) -> String {
    format!(
        "Write a concise, engaging description (150-200 words) for this recipe:
Name: {name}
Ingredients: {ingredients}
Instructions: {instructions}
Cooking Method: {methods}
Cuisine: {cuisine}
Category: {category}

Focus on:
1. Key ingredients and their roles
2. Cooking technique highlights
3. Flavor profile and texture
4. Serving suggestions
5. What makes this recipe special

Keep it concise and avoid repetition.",
        name = recipe.name,
        ingredients = recipe.main_ingredients.iter().join(", "),
        instructions = recipe.instructions,
        methods = recipe.cooking_methods.iter().join(", "),
        cuisine = recipe.cuisine,
        category = recipe.category,
    )
}
